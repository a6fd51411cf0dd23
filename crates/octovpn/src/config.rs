//! Settings resolution with CLI flag overrides.

use std::path::PathBuf;
use std::sync::Arc;

use octovpn_config::{FileBackend, Settings};
use octovpn_core::{NativeBackend, NoWindow, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global
        .settings
        .clone()
        .unwrap_or_else(octovpn_config::settings_path)
}

/// Load settings from file + env, then apply flags.
pub fn resolve_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let mut settings = octovpn_config::load_settings_from(&settings_path(global))?;
    if let Some(ref dir) = global.data_dir {
        settings.data_dir = Some(dir.clone());
    }
    if let Some(ref url) = global.api_url {
        settings.api_url.clone_from(url);
    }
    if let Some(secs) = global.timeout {
        settings.timeout_secs = secs;
    }
    if global.insecure {
        settings.insecure = true;
    }
    tracing::debug!(?settings, "settings resolved");
    Ok(settings)
}

/// Build a headless session over the file-backed backend.
pub fn build_session(settings: &Settings) -> Result<(Session, Arc<FileBackend>), CliError> {
    let api = settings.api_client()?;
    let backend = Arc::new(FileBackend::from_settings(settings));
    let session = Session::new(
        settings.session_config(),
        Arc::new(api),
        Arc::clone(&backend) as Arc<dyn NativeBackend>,
        Arc::new(NoWindow),
    );
    Ok((session, backend))
}
