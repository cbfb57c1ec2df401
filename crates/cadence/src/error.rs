//! Error types for cadence operations.

use crate::domain::{EntityKind, IssueId, SprintAction, SprintId, SprintStatus};
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for cadence operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error outside of state persistence.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of entity was looked up
        kind: EntityKind,
        /// The id that was not found
        id: String,
    },

    /// A sprint lifecycle operation is not legal in the sprint's current state.
    #[error("Cannot {action} sprint {sprint_id}: sprint is {from}")]
    InvalidTransition {
        /// The sprint
        sprint_id: SprintId,
        /// State the sprint was in
        from: SprintStatus,
        /// The rejected operation
        action: SprintAction,
    },

    /// A reorder named the moved issue as its own anchor.
    #[error("Issue {0} cannot be placed before itself")]
    SelfAnchor(IssueId),

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backup payload was rejected.
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    /// ID generation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),
}

impl Error {
    /// Build a `NotFound` error for any displayable id.
    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.cadence/` directory was found up the directory tree.
    #[error("Not a cadence repository (or any parent). Run 'cadence init' first.")]
    NotInitialized,

    /// `init` ran in a directory that already has `.cadence/`.
    #[error("Cadence is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// The issue prefix failed validation.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// The config file could not be parsed or written.
    #[error("Configuration error: {0}")]
    Parse(String),

    /// The configured storage backend is unknown.
    #[error("Unknown storage backend '{0}' (expected 'file' or 'memory')")]
    UnknownBackend(String),
}

/// Errors from the persisted state layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The blob store failed.
    #[error("Blob store error: {0}")]
    Blob(#[from] cadence_blob::Error),

    /// The state could not be serialized.
    #[error("Failed to serialize state: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The persisted state could not be parsed.
    #[error("Persisted state is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// A specialized Result type for cadence operations.
pub type Result<T> = std::result::Result<T, Error>;
