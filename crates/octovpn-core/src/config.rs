// ── Session tuning ──
//
// Runtime knobs for the synchronization core. Built by the CLI from
// `octovpn-config::Settings`; the core never reads files itself.

use std::time::Duration;

use octovpn_api::OpenVpnTransport;

/// Logical window dimensions handed to [`WindowHandle`](crate::WindowHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalSize {
    pub width: u32,
    pub height: u32,
}

impl LogicalSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a WireGuard `Connected`/`Disconnected` event is held back
    /// before it reaches the status store.
    pub wireguard_debounce: Duration,
    /// Transport segment used when requesting OpenVPN profiles.
    pub openvpn_transport: OpenVpnTransport,
    /// Window size while logged out.
    pub logged_out_size: LogicalSize,
    /// Window size while logged in.
    pub logged_in_size: LogicalSize,
    /// Upper bound for [`Session::oneshot`](crate::Session::oneshot) to wait
    /// on the startup login.
    pub settle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wireguard_debounce: Duration::from_millis(1000),
            openvpn_transport: OpenVpnTransport::Udp,
            logged_out_size: LogicalSize::new(400, 500),
            logged_in_size: LogicalSize::new(800, 650),
            settle_timeout: Duration::from_secs(30),
        }
    }
}
