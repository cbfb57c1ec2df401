//! The persisted application state blob.

use super::EntityStore;
use crate::domain::{ProjectId, Theme};
use crate::error::{Error, Result, StorageError};
use serde::{Deserialize, Serialize};

/// Top-level keys a backup payload must carry to be accepted.
pub const REQUIRED_BACKUP_KEYS: [&str; 3] = ["projects", "users", "issues"];

/// The entity store plus the scalar session fields, serialized as one JSON
/// object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// All entities
    #[serde(flatten)]
    pub store: EntityStore,

    /// Project selected in the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_project_id: Option<ProjectId>,

    /// UI theme
    #[serde(default)]
    pub theme: Theme,

    /// Session flag carried through backups untouched
    #[serde(default)]
    pub authenticated: bool,
}

impl AppState {
    /// Serialize the state to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        Ok(bytes.map_err(StorageError::Serialization)?)
    }

    /// Parse persisted state and rebuild id registration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the bytes are not a valid state.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut state: Self = serde_json::from_slice(bytes).map_err(StorageError::Corrupt)?;
        state.store.reindex();
        Ok(state)
    }

    /// Parse a user-supplied backup.
    ///
    /// The payload must be a JSON object carrying every key in
    /// [`REQUIRED_BACKUP_KEYS`]; anything else is rejected before any
    /// entity is decoded.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBackup` for malformed payloads.
    pub fn from_backup(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| Error::InvalidBackup(format!("not valid JSON: {e}")))?;

        let Some(object) = value.as_object() else {
            return Err(Error::InvalidBackup("expected a JSON object".to_string()));
        };

        let missing: Vec<&str> = REQUIRED_BACKUP_KEYS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidBackup(format!(
                "missing required keys: {}",
                missing.join(", ")
            )));
        }

        let mut state: Self =
            serde_json::from_value(value).map_err(|e| Error::InvalidBackup(e.to_string()))?;
        state.store.reindex();
        Ok(state)
    }
}
