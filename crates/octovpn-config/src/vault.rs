// ── Password vault ──
//
// Where the saved login password lives when it is kept out of
// `config.json`. The OS keyring in production, a map in tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::ConfigError;

/// Keyring service name for every OctoVPN entry.
pub const KEYRING_SERVICE: &str = "octovpn";

pub trait PasswordVault: Send + Sync {
    fn get(&self, username: &str) -> Result<Option<SecretString>, ConfigError>;
    fn set(&self, username: &str, password: &SecretString) -> Result<(), ConfigError>;
    /// Removing a missing entry is not an error.
    fn delete(&self, username: &str) -> Result<(), ConfigError>;
}

/// The platform keyring (Secret Service, Keychain, Credential Manager).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyring;

impl OsKeyring {
    fn entry(username: &str) -> Result<keyring::Entry, ConfigError> {
        Ok(keyring::Entry::new(KEYRING_SERVICE, &format!("{username}/password"))?)
    }
}

impl PasswordVault for OsKeyring {
    fn get(&self, username: &str) -> Result<Option<SecretString>, ConfigError> {
        match Self::entry(username)?.get_password() {
            Ok(pw) => Ok(Some(SecretString::from(pw))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, username: &str, password: &SecretString) -> Result<(), ConfigError> {
        Self::entry(username)?.set_password(password.expose_secret())?;
        debug!(username, "password stored in keyring");
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<(), ConfigError> {
        match Self::entry(username)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local vault.
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PasswordVault for MemoryVault {
    fn get(&self, username: &str) -> Result<Option<SecretString>, ConfigError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(username).cloned().map(SecretString::from))
    }

    fn set(&self, username: &str, password: &SecretString) -> Result<(), ConfigError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_owned(), password.expose_secret().to_owned());
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<(), ConfigError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(username);
        Ok(())
    }
}
