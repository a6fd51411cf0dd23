//! Async client for the OctoVPN control-plane REST API.
//!
//! The API is a small JSON service (`/api/v1`) that issues session tokens,
//! lists server locations and hands out OpenVPN/WireGuard profiles. Every
//! response is wrapped in a `{success, data, error}` envelope which
//! [`ApiClient`] strips before returning.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod account;
mod configs;
mod locations;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{
    Account, ApiErrorBody, ApiResponse, ConfigResponse, Location, LoginResponse, LogoutResponse,
    OpenVpnTransport,
};
pub use transport::{TlsMode, TransportConfig};
