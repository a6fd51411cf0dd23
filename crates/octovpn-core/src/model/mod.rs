// ── Domain model ──

pub mod config;
pub mod location;
pub mod status;

pub use config::{Config, Credentials, Protocol};
pub use location::{Account, Location, LocationFilter, group_by_country};
pub use status::{ConnectionStatus, OpenVpnStatus};
