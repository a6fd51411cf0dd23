// ── Tunnel profile patching ──

use secrecy::ExposeSecret;

use octovpn_core::{Credentials, Protocol};

/// Management interface the backend polls for `openvpn_status`.
pub const MANAGEMENT_ADDR: &str = "localhost 7505";

/// Directives the OpenVPN CLI client chokes on; commented out, not removed.
const DISABLED_DIRECTIVES: &[&str] = &["route-method exe", "route-delay 2", "register-dns"];

/// Prepare a control-plane profile for the local tunnel manager.
///
/// OpenVPN profiles get inline `auth-user-pass` credentials, the
/// incompatible directives commented out, and the management interface
/// enabled. WireGuard profiles pass through untouched.
pub fn patch(protocol: Protocol, profile: &str, credentials: Option<&Credentials>) -> String {
    if protocol == Protocol::WireGuard {
        return profile.to_owned();
    }

    let mut out = profile.to_owned();
    if let Some(c) = credentials {
        out.push_str("\n\n<auth-user-pass>\n");
        out.push_str(&c.username);
        out.push('\n');
        out.push_str(c.password.expose_secret());
        out.push_str("\n</auth-user-pass>");
    }
    for directive in DISABLED_DIRECTIVES {
        out = out.replace(directive, &format!("# {directive}"));
    }
    out.push_str(&format!("\n\nmanagement {MANAGEMENT_ADDR}\nverb 2"));
    out
}
