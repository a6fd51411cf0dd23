// ── User configuration ──
//
// The persisted user preferences. Wire shape matches the `config.json`
// the native backend has always written: `discordRPC` key, protocol as
// an integer.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::EnumIter;

/// Saved login.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl Eq for Credentials {}

fn serialize_secret<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose_secret())
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}

/// Tunnel protocol. Serialized as `0` (OpenVPN) / `1` (WireGuard).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Protocol {
    #[default]
    OpenVpn,
    WireGuard,
}

impl Protocol {
    /// Directory under the data dir holding this protocol's tunnel file.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::OpenVpn => "openvpn",
            Self::WireGuard => "wireguard",
        }
    }

    /// File name of the patched tunnel profile.
    pub fn profile_file_name(self) -> &'static str {
        match self {
            Self::OpenVpn => "config.ovpn",
            Self::WireGuard => "wireguard.conf",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenVpn => "OpenVPN",
            Self::WireGuard => "WireGuard",
        })
    }
}

impl From<Protocol> for u8 {
    fn from(p: Protocol) -> Self {
        match p {
            Protocol::OpenVpn => 0,
            Protocol::WireGuard => 1,
        }
    }
}

impl TryFrom<u8> for Protocol {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::OpenVpn),
            1 => Ok(Self::WireGuard),
            other => Err(format!("unknown protocol {other}")),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openvpn" | "ovpn" | "0" => Ok(Self::OpenVpn),
            "wireguard" | "wg" | "1" => Ok(Self::WireGuard),
            other => Err(format!(
                "unknown protocol '{other}' (expected openvpn or wireguard)"
            )),
        }
    }
}

/// User configuration owned by the native backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(rename = "discordRPC", default)]
    pub discord_rpc: bool,
    /// `None` only when the backend explicitly stored `null`; such a
    /// config is never persisted back.
    #[serde(default = "default_protocol")]
    pub protocol: Option<Protocol>,
}

fn default_theme() -> String {
    "dark".to_owned()
}

#[allow(clippy::unnecessary_wraps)]
fn default_protocol() -> Option<Protocol> {
    Some(Protocol::OpenVpn)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: None,
            theme: default_theme(),
            discord_rpc: false,
            protocol: default_protocol(),
        }
    }
}

impl Config {
    /// The protocol policy in effect, treating an unset protocol as OpenVPN.
    pub fn effective_protocol(&self) -> Protocol {
        self.protocol.unwrap_or_default()
    }
}
