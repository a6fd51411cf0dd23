// ── Client settings ──
//
// Layered with figment: built-in defaults, then `settings.toml` from the
// platform config dir, then `OCTOVPN_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use octovpn_core::{
    ApiClient, DEFAULT_BASE_URL, OpenVpnTransport, SessionConfig, TlsMode, TransportConfig,
};

use crate::error::ConfigError;

/// Client-side settings. Unlike the user [`Config`](octovpn_core::Config),
/// these are never written by the session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Control-plane base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// PEM file with an extra CA certificate.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// Transport segment for OpenVPN profile requests.
    #[serde(default)]
    pub openvpn_transport: OpenVpnTransport,

    /// Hold-back for settled WireGuard status events, in milliseconds.
    #[serde(default = "default_debounce")]
    pub wireguard_debounce_ms: u64,

    /// Where `config.json`, tunnel profiles and logs live.
    /// Defaults to `~/.octovpn`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Keep the saved password in the OS keyring instead of `config.json`.
    #[serde(default)]
    pub keyring: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
            openvpn_transport: OpenVpnTransport::Udp,
            wireguard_debounce_ms: default_debounce(),
            data_dir: None,
            keyring: false,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_debounce() -> u64 {
    1000
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
pub fn settings_path() -> PathBuf {
    ProjectDirs::from("com", "octovpn", "octovpn").map_or_else(
        || home_dir().join(".config").join("octovpn").join("settings.toml"),
        |dirs| dirs.config_dir().join("settings.toml"),
    )
}

fn home_dir() -> PathBuf {
    BaseDirs::new().map_or_else(|| PathBuf::from("."), |b| b.home_dir().to_path_buf())
}

impl Settings {
    /// The effective data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(".octovpn"))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    // ── Translation ─────────────────────────────────────────────────

    pub fn transport_config(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            wireguard_debounce: Duration::from_millis(self.wireguard_debounce_ms),
            openvpn_transport: self.openvpn_transport,
            ..SessionConfig::default()
        }
    }

    /// Build the control-plane client these settings describe.
    pub fn api_client(&self) -> Result<ApiClient, ConfigError> {
        let url: url::Url = self.api_url.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", self.api_url),
        })?;
        ApiClient::new(url, &self.transport_config()).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: e.to_string(),
        })
    }
}

// ── Loading / saving ────────────────────────────────────────────────

/// The provider chain, exposed so callers can merge extra layers
/// (CLI flags) on top.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OCTOVPN_"))
}

/// Load settings from the canonical path and the environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = figment(path).extract()?;
    if settings.wireguard_debounce_ms > 60_000 {
        return Err(ConfigError::Validation {
            field: "wireguard_debounce_ms".into(),
            reason: format!("{} is longer than a minute", settings.wireguard_debounce_ms),
        });
    }
    Ok(settings)
}

/// Serialize settings to TOML at `path`, creating parent directories.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}
