use thiserror::Error;

/// Top-level error type for the `octovpn-api` crate.
///
/// A failed call never panics: transport problems, HTTP failures and
/// `{"success": false, "error": {...}}` envelopes all land here.
/// `octovpn-core` maps these into its own domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials or token rejected (HTTP 401, or envelope code 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `data:` URLs).
    #[error("Base URL cannot be a base: {0}")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status without a decodable envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── API envelope ────────────────────────────────────────────────
    /// Structured failure from the `{success: false, error: {code, message}}` envelope.
    #[error("API error ({code}): {message}")]
    Api { code: i64, message: String },

    /// `success: true` but the envelope carried no `data`.
    #[error("API response for {endpoint} carried no data")]
    MissingData { endpoint: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server rejected the credentials or token.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Api { code, .. } => *code == 401 || *code == 403,
            Self::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
