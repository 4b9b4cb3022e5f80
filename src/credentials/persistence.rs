//! Credential state file.
//!
//! JSON object keyed by the raw credential value:
//! `{"<key>": {"expired": true, "expiredAt": 1718000000000}}`.
//! Reading and writing are best-effort; failures are logged, never returned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted view of a single credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCredential {
    #[serde(default)]
    pub expired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<u64>,
}

pub type PersistedState = HashMap<String, PersistedCredential>;

/// Location of the state file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read prior state. Missing or malformed files yield an empty map.
    pub fn read(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "No credential state file, starting fresh");
                return PersistedState::new();
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read credential state, starting fresh");
                return PersistedState::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Ignoring malformed credential state file");
                PersistedState::new()
            }
        }
    }

    /// Overwrite the file with `state`, pretty printed. Errors are swallowed.
    pub fn write(&self, state: &PersistedState) {
        if let Err(e) = self.try_write(state) {
            tracing::warn!(path = ?self.path, error = %e, "Failed to persist credential state");
        }
    }

    fn try_write(&self, state: &PersistedState) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
    }
}
