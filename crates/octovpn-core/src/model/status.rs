// ── Connection status ──
//
// Status values pushed by the native backend, plus the OpenVPN
// management-interface snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::CoreError;

/// Tunnel state. Travels as an integer `0..=3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionStatus {
    /// `Connected` or `Disconnected`: the values the WireGuard debounce holds back.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }
}

impl From<ConnectionStatus> for u8 {
    fn from(s: ConnectionStatus) -> Self {
        match s {
            ConnectionStatus::Disconnected => 0,
            ConnectionStatus::Connecting => 1,
            ConnectionStatus::Connected => 2,
            ConnectionStatus::Disconnecting => 3,
        }
    }
}

impl TryFrom<u8> for ConnectionStatus {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Disconnected),
            1 => Ok(Self::Connecting),
            2 => Ok(Self::Connected),
            3 => Ok(Self::Disconnecting),
            other => Err(format!("unknown connection status {other}")),
        }
    }
}

/// Snapshot of the OpenVPN management interface `state` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenVpnStatus {
    /// Unix timestamp of the state change.
    pub start: u64,
    pub connected: bool,
    pub state: String,
    pub local_ip: String,
    pub remote_ip: String,
    pub port: u16,
}

impl OpenVpnStatus {
    /// Parse a management `state` line such as
    /// `1700000000,CONNECTED,SUCCESS,10.8.0.2,203.0.113.5,1194,,`.
    ///
    /// `>INFO` banners and other lines with fewer than six fields yield
    /// `Ok(None)`. NUL padding from the socket read is ignored.
    pub fn from_state_line(line: &str) -> Result<Option<Self>, CoreError> {
        let line = line.replace('\0', "");
        let line = line.trim();
        if line.is_empty() || line.starts_with(">INFO") {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(',').collect();
        let [start, state, _desc, local_ip, remote_ip, port, ..] = fields.as_slice() else {
            return Ok(None);
        };

        let start = start.parse::<u64>().map_err(|e| CoreError::ValidationFailed {
            message: format!("bad OpenVPN state timestamp '{start}': {e}"),
        })?;
        let port = if port.is_empty() {
            0
        } else {
            port.parse::<u16>().map_err(|e| CoreError::ValidationFailed {
                message: format!("bad OpenVPN remote port '{port}': {e}"),
            })?
        };

        Ok(Some(Self {
            start,
            connected: *state == "CONNECTED",
            state: (*state).to_owned(),
            local_ip: (*local_ip).to_owned(),
            remote_ip: (*remote_ip).to_owned(),
            port,
        }))
    }

    /// `start` as a wall-clock time.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.start)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
