//! Host-side configuration for OctoVPN tools.
//!
//! Client [`Settings`] (figment: defaults, `settings.toml`, `OCTOVPN_*`
//! env), the password [`vault`] (OS keyring), and [`FileBackend`], the
//! `NativeBackend` that keeps `config.json` and tunnel profiles on disk.

pub mod backend;
pub mod error;
pub mod profile;
pub mod settings;
pub mod vault;

pub use backend::FileBackend;
pub use error::ConfigError;
pub use settings::{
    Settings, figment, load_settings, load_settings_from, save_settings, settings_path,
};
pub use vault::{KEYRING_SERVICE, MemoryVault, OsKeyring, PasswordVault};
