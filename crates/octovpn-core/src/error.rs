// ── Core error types ──
//
// Errors surfaced by the session core. Consumers never see raw HTTP
// statuses or envelope shapes; the `From<octovpn_api::Error>` impl
// translates them into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Configuration has not been loaded yet")]
    ConfigNotLoaded,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the control plane: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Envelope error code, when the server sent one.
        code: Option<i64>,
        /// HTTP status, when the failure was not an envelope.
        status: Option<u16>,
    },

    // ── Native backend errors ────────────────────────────────────────
    #[error("Backend command '{command}' failed: {message}")]
    Backend { command: String, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn backend(command: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            command: command.to_owned(),
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<octovpn_api::Error> for CoreError {
    fn from(err: octovpn_api::Error) -> Self {
        match err {
            octovpn_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            octovpn_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            octovpn_api::Error::InvalidUrl(e) => CoreError::ConnectionFailed {
                reason: format!("invalid URL: {e}"),
            },
            octovpn_api::Error::InvalidBaseUrl(url) => CoreError::ConnectionFailed {
                reason: format!("invalid base URL: {url}"),
            },
            octovpn_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            octovpn_api::Error::Http { status, message } => CoreError::Api {
                message,
                code: None,
                status: Some(status),
            },
            octovpn_api::Error::Api { code, message } => CoreError::Api {
                message,
                code: Some(code),
                status: None,
            },
            octovpn_api::Error::MissingData { endpoint } => {
                CoreError::Internal(format!("empty response from {endpoint}"))
            }
            octovpn_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
