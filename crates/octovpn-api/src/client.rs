// Control-plane HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, the two header
// conventions the control plane expects, and envelope unwrapping.
// Endpoint methods live in `account`, `locations` and `configs`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;
use crate::transport::TransportConfig;

/// Production control-plane endpoint.
pub const DEFAULT_BASE_URL: &str = "https://617069.6f63746f76706e.com:8443/api/v1";

/// How the token is placed in the `Authorization` header.
///
/// `/account` wants `Bearer <token>`; every other authenticated endpoint
/// wants the bare token.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Authorization<'a> {
    Bearer(&'a str),
    Raw(&'a str),
}

impl Authorization<'_> {
    fn header_value(self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Raw(token) => token.to_owned(),
        }
    }
}

/// Stateless client for the control-plane REST API.
///
/// Every method returns the unwrapped `data` payload; a `success: false`
/// envelope or a transport failure comes back as [`Error`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root including the version prefix, e.g.
    /// `https://host:8443/api/v1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client pointed at [`DEFAULT_BASE_URL`].
    pub fn production(transport: &TransportConfig) -> Result<Self, Error> {
        Self::new(Url::parse(DEFAULT_BASE_URL)?, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        auth: Authorization<'_>,
    ) -> Result<T, Error> {
        debug!("GET {}", url);
        let endpoint = url.path().to_owned();

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth.header_value())
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp, &endpoint).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let endpoint = url.path().to_owned();

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp, &endpoint).await
    }
}

/// Decode the `{ success, data, error }` envelope.
///
/// The control plane reports failures in the envelope even on non-2xx
/// statuses, so the body is tried first and the HTTP status only decides
/// the error when the body is not an envelope.
async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(%status, bytes = body.len(), "response received");

    match serde_json::from_str::<ApiResponse<T>>(&body) {
        Ok(envelope) => envelope.into_result(endpoint),
        Err(_) if status == reqwest::StatusCode::UNAUTHORIZED => Err(Error::Authentication {
            message: "token expired or invalid credentials".into(),
        }),
        Err(_) if !status.is_success() => Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        }),
        Err(e) => Err(Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        }),
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
