// ── File-backed native backend ──
//
// Keeps `config.json` and the patched tunnel profiles under the data
// directory. Tunnel state is tracked in-process: toggling records the
// protocol and pushes the same status events a service-backed tunnel
// manager would.

use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use octovpn_core::{
    BackendEvent, Config, ConnectionRequest, ConnectionStatus, CoreError, Credentials,
    NativeBackend, OpenVpnStatus, Protocol,
};

use crate::error::ConfigError;
use crate::profile;
use crate::settings::Settings;
use crate::vault::{OsKeyring, PasswordVault};

const CONFIG_FILE: &str = "config.json";
const EVENT_CAPACITY: usize = 64;

pub struct FileBackend {
    data_dir: PathBuf,
    vault: Option<Arc<dyn PasswordVault>>,
    connected: Mutex<Option<Protocol>>,
    discord_rpc: AtomicBool,
    events: broadcast::Sender<BackendEvent>,
}

impl FileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            data_dir: data_dir.into(),
            vault: None,
            connected: Mutex::new(None),
            discord_rpc: AtomicBool::new(false),
            events,
        }
    }

    /// Keep saved passwords in `vault` rather than in `config.json`.
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<dyn PasswordVault>) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let backend = Self::new(settings.data_dir());
        if settings.keyring {
            backend.with_vault(Arc::new(OsKeyring))
        } else {
            backend
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn profile_path(&self, protocol: Protocol) -> PathBuf {
        self.data_dir
            .join(protocol.dir_name())
            .join(protocol.profile_file_name())
    }

    pub fn discord_rpc_enabled(&self) -> bool {
        self.discord_rpc.load(Ordering::SeqCst)
    }

    /// Parse one OpenVPN management `state` reply and push it as an
    /// `openvpn_status` event. Banner lines push nothing.
    pub fn push_management_state(&self, line: &str) -> Result<(), CoreError> {
        if let Some(status) = OpenVpnStatus::from_state_line(line)? {
            self.emit(BackendEvent::OpenVpnStatus(Some(status)));
        }
        Ok(())
    }

    /// Tell listeners the management interface went away.
    pub fn management_unreachable(&self) {
        self.emit(BackendEvent::OpenVpnStatus(None));
    }

    fn emit(&self, event: BackendEvent) {
        // No receivers is fine; the session may not have started yet.
        if self.events.send(event).is_err() {
            debug!("backend event dropped; no subscribers");
        }
    }

    fn connected(&self) -> Option<Protocol> {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_connected(&self, protocol: Option<Protocol>) {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner) = protocol;
    }

    // ── config.json ──────────────────────────────────────────────────

    async fn read_config(&self) -> Result<Config, ConfigError> {
        let path = self.config_path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config.json yet; using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config.json is corrupt; using defaults");
                return Ok(Config::default());
            }
        };

        if let (Some(vault), Some(creds)) = (&self.vault, config.credentials.as_mut()) {
            if creds.password.expose_secret().is_empty() {
                if let Some(password) = vault.get(&creds.username)? {
                    creds.password = password;
                }
            }
        }
        Ok(config)
    }

    async fn write_config(&self, config: &Config) -> Result<(), ConfigError> {
        let mut on_disk = config.clone();
        if let (Some(vault), Some(creds)) = (&self.vault, on_disk.credentials.as_mut()) {
            vault.set(&creds.username, &creds.password)?;
            creds.password = SecretString::from(String::new());
        }

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.config_path();
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&on_disk)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "config.json written");
        Ok(())
    }

    /// Drop the saved login from the vault, if one is configured.
    pub fn forget_password(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        match &self.vault {
            Some(vault) => vault.delete(&credentials.username),
            None => Ok(()),
        }
    }

    // ── Tunnel ───────────────────────────────────────────────────────

    async fn bring_up(&self, request: ConnectionRequest) -> Result<bool, CoreError> {
        let protocol = request.protocol;
        self.emit(BackendEvent::Status(ConnectionStatus::Connecting));

        let Some(raw) = request.config.as_deref() else {
            self.emit(BackendEvent::Status(ConnectionStatus::Disconnected));
            return Err(failure("toggle_connection", "no tunnel profile supplied"));
        };
        let patched = profile::patch(protocol, raw, request.credentials.as_ref());

        let path = self.profile_path(protocol);
        let written = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, patched).await
        }
        .await;
        if let Err(e) = written {
            self.emit(BackendEvent::Status(ConnectionStatus::Disconnected));
            return Err(failure("toggle_connection", e));
        }

        self.set_connected(Some(protocol));
        info!(%protocol, path = %path.display(), "tunnel up");
        self.emit(BackendEvent::Status(ConnectionStatus::Connected));
        Ok(true)
    }

    async fn tear_down(&self) -> Result<bool, CoreError> {
        let Some(protocol) = self.connected() else {
            debug!("disconnect requested with no tunnel up");
            return Ok(false);
        };
        self.emit(BackendEvent::Status(ConnectionStatus::Disconnecting));

        match tokio::fs::remove_file(self.profile_path(protocol)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, "failed to remove tunnel profile"),
        }

        self.set_connected(None);
        info!(%protocol, "tunnel down");
        self.emit(BackendEvent::Status(ConnectionStatus::Disconnected));
        if protocol == Protocol::OpenVpn {
            self.management_unreachable();
        }
        Ok(true)
    }
}

fn failure(command: &str, message: impl Display) -> CoreError {
    CoreError::Backend {
        command: command.into(),
        message: message.to_string(),
    }
}

impl NativeBackend for FileBackend {
    fn load_config(&self) -> BoxFuture<'_, Result<Config, CoreError>> {
        Box::pin(async move { self.read_config().await.map_err(|e| failure("load_config", e)) })
    }

    fn save_config<'a>(&'a self, config: &'a Config) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.write_config(config)
                .await
                .map_err(|e| failure("save_config", e))
        })
    }

    fn preflight_check(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        Box::pin(async move {
            for dir in ["logs", Protocol::OpenVpn.dir_name(), Protocol::WireGuard.dir_name()] {
                tokio::fs::create_dir_all(self.data_dir.join(dir))
                    .await
                    .map_err(|e| failure("preflight_check", e))?;
            }
            debug!(data_dir = %self.data_dir.display(), "data directories ready");
            Ok(())
        })
    }

    fn is_connected(&self) -> BoxFuture<'_, Result<Option<Protocol>, CoreError>> {
        let connected = self.connected();
        Box::pin(async move { Ok(connected) })
    }

    fn toggle_connection(
        &self,
        request: ConnectionRequest,
    ) -> BoxFuture<'_, Result<bool, CoreError>> {
        Box::pin(async move {
            if request.connect {
                self.bring_up(request).await
            } else {
                self.tear_down().await
            }
        })
    }

    fn toggle_discord_rpc(&self, enable: bool) -> BoxFuture<'_, Result<(), CoreError>> {
        self.discord_rpc.store(enable, Ordering::SeqCst);
        debug!(enable, "discord presence toggled");
        Box::pin(async { Ok(()) })
    }

    fn events(&self) -> broadcast::Receiver<BackendEvent> {
        self.events.subscribe()
    }
}
