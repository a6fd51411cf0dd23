//! Session and configuration synchronization core for the OctoVPN client.
//!
//! - **[`Session`]**: owns the [`Stores`] and wires the reaction rules
//!   ([`RULES`]) between the control plane, the native backend and the
//!   stores. [`Session::oneshot()`] runs a single request cycle for CLI use.
//!
//! - **[`Store<T>`]**: observable single value with synchronous listeners
//!   and `watch` receivers for async consumers.
//!
//! - **Seams**: [`ControlPlane`] (implemented for
//!   [`ApiClient`](octovpn_api::ApiClient)), [`NativeBackend`] and
//!   [`WindowHandle`] keep the core free of I/O it does not own.
//!
//! - **Domain model** ([`model`]): `Config`, `Credentials`, `Protocol`,
//!   `ConnectionStatus`, `OpenVpnStatus`, plus location filters.

pub mod backend;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{BackendEvent, ConnectionRequest, NativeBackend, NoWindow, WindowHandle};
pub use config::{LogicalSize, SessionConfig};
pub use control_plane::ControlPlane;
pub use error::CoreError;
pub use session::{RULES, Rule, Session, Trigger};
pub use store::{ListenerId, RequestSequencer, Store, Stores, Ticket};

pub use model::{
    Account, Config, ConnectionStatus, Credentials, Location, LocationFilter, OpenVpnStatus,
    Protocol, group_by_country,
};

// Re-export API types consumers need without depending on octovpn-api.
pub use octovpn_api::{ApiClient, DEFAULT_BASE_URL, OpenVpnTransport, TlsMode, TransportConfig};
