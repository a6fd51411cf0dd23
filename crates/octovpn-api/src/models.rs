// Control-plane wire types
//
// Field names follow the server 1:1. Ids and flags arrive as strings,
// numbers or booleans depending on the endpoint revision, so they are
// captured as the raw scalar rendered to a string and interpreted by
// accessor methods.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// ── Envelope ─────────────────────────────────────────────────────────

/// Wrapper around every control-plane response:
/// `{ "success": bool, "data": T?, "error": { "code", "message" }? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error body carried by a `success: false` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Collapse the envelope into a `Result`.
    ///
    /// `endpoint` only feeds the `MissingData` message.
    pub fn into_result(self, endpoint: &str) -> Result<T, Error> {
        if !self.success {
            let body = self.error.unwrap_or_default();
            return Err(if body.code == 401 {
                Error::Authentication {
                    message: body.message,
                }
            } else {
                Error::Api {
                    code: body.code,
                    message: body.message,
                }
            });
        }
        self.data.ok_or_else(|| Error::MissingData {
            endpoint: endpoint.to_owned(),
        })
    }
}

// ── Account ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest<'a> {
    pub token: &'a str,
}

/// `POST /account/login` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /account/logout` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub message: String,
}

/// `GET /account` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl Account {
    /// `"First Last"`, falling back to the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone().unwrap_or_default()
        } else {
            full
        }
    }
}

// ── Locations ────────────────────────────────────────────────────────

/// A VPN server location from `GET /locations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub status: String,
    #[serde(
        rename = "hasWireGuardConfig",
        default,
        deserialize_with = "scalar_string"
    )]
    pub has_wireguard_config: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub country_code: String,
}

impl Location {
    /// Whether the server reports this location as usable.
    pub fn is_online(&self) -> bool {
        truthy(&self.status)
    }

    /// Whether a WireGuard config can be requested for this location.
    pub fn has_wireguard(&self) -> bool {
        truthy(&self.has_wireguard_config)
    }

    /// `"City, Country"` or just the country.
    pub fn label(&self) -> String {
        match self.city.as_deref().filter(|c| !c.is_empty()) {
            Some(city) => format!("{city}, {}", self.country),
            None => self.country.clone(),
        }
    }
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "up" | "online" | "active"
    )
}

// ── Tunnel configs ───────────────────────────────────────────────────

/// `GET /configs/...` payload: the opaque tunnel profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub config: String,
}

/// OpenVPN transport segment of the config path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenVpnTransport {
    #[default]
    Udp,
    Tcp,
}

impl OpenVpnTransport {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for OpenVpnTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OpenVpnTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            other => Err(format!("unknown OpenVPN transport '{other}' (expected udp or tcp)")),
        }
    }
}

// ── Serde helpers ────────────────────────────────────────────────────

/// Accept a string, number or bool and keep its textual form. `null` maps to "".
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {other}"
        ))),
    }
}
