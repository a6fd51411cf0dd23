// ── Native backend seam ──
//
// Commands the session invokes on the out-of-process tunnel manager,
// and the events it pushes back.

use futures_util::future::BoxFuture;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::LogicalSize;
use crate::error::CoreError;
use crate::model::{Config, ConnectionStatus, Credentials, OpenVpnStatus, Protocol};

/// Push notification from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The `status` event.
    Status(ConnectionStatus),
    /// The `openvpn_status` event; `None` when the management interface
    /// is unreachable.
    OpenVpnStatus(Option<OpenVpnStatus>),
}

/// Arguments of the `toggle_connection` command.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    /// `true` brings the tunnel up, `false` tears it down.
    pub connect: bool,
    pub protocol: Protocol,
    /// Tunnel profile from the control plane. Only set when connecting.
    pub config: Option<String>,
    pub credentials: Option<Credentials>,
}

/// Commands exposed by the native backend.
pub trait NativeBackend: Send + Sync {
    fn load_config(&self) -> BoxFuture<'_, Result<Config, CoreError>>;

    fn save_config<'a>(&'a self, config: &'a Config) -> BoxFuture<'a, Result<(), CoreError>>;

    /// Verify the host is ready to run tunnels. Fire-and-forget.
    fn preflight_check(&self) -> BoxFuture<'_, Result<(), CoreError>>;

    /// Protocol of the tunnel currently up, if any.
    fn is_connected(&self) -> BoxFuture<'_, Result<Option<Protocol>, CoreError>>;

    /// Bring a tunnel up or down. `Ok(false)` means the backend refused.
    fn toggle_connection(&self, request: ConnectionRequest) -> BoxFuture<'_, Result<bool, CoreError>>;

    fn toggle_discord_rpc(&self, enable: bool) -> BoxFuture<'_, Result<(), CoreError>>;

    /// A fresh receiver for backend events.
    fn events(&self) -> broadcast::Receiver<BackendEvent>;
}

/// Host window the session resizes on login/logout.
pub trait WindowHandle: Send + Sync {
    fn set_size(&self, size: LogicalSize);
}

/// Window handle for headless consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindow;

impl WindowHandle for NoWindow {
    fn set_size(&self, size: LogicalSize) {
        debug!(width = size.width, height = size.height, "window resize (headless)");
    }
}
