//! Loading and saving the application state blob.
//!
//! The whole [`AppState`] is stored as one JSON document under
//! [`STATE_KEY`] in a [`BlobStore`]. Every save rewrites it in full.
//!
//! # Example
//!
//! ```no_run
//! use cadence::persistence::{StorageBackend, load_state, open_blob_store};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let blobs = open_blob_store(StorageBackend::File(".cadence/data".into())).await?;
//!     let state = load_state(blobs.as_ref()).await?;
//!     println!("{} issues", state.store.issues().count());
//!     Ok(())
//! }
//! ```

use crate::error::{Result, StorageError};
use crate::store::AppState;
use cadence_blob::{BlobStore, FileBlobStore, MemoryBlobStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Blob key holding the serialized state
pub const STATE_KEY: &str = "state.json";

/// Storage backend configuration.
///
/// Determines which blob store implementation to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// One file per blob inside a data directory (persistent)
    File(PathBuf),

    /// Process memory (ephemeral)
    Memory,
}

impl StorageBackend {
    /// Returns the data directory for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::File(path) => Some(path),
            StorageBackend::Memory => None,
        }
    }
}

/// Create a blob store for the given backend.
///
/// # Errors
///
/// Returns `StorageError::Blob` if the data directory cannot be created.
pub async fn open_blob_store(backend: StorageBackend) -> Result<Box<dyn BlobStore>> {
    match backend {
        StorageBackend::File(path) => {
            let store = FileBlobStore::open(&path).await.map_err(StorageError::from)?;
            Ok(Box::new(store))
        }
        StorageBackend::Memory => Ok(Box::new(MemoryBlobStore::new())),
    }
}

/// Read the state from a blob store.
///
/// A store with no state blob yields an empty state (first run).
///
/// # Errors
///
/// Returns `StorageError::Blob` on read failure and `StorageError::Corrupt`
/// if the blob does not parse.
pub async fn load_state(blobs: &dyn BlobStore) -> Result<AppState> {
    match blobs.get(STATE_KEY).await.map_err(StorageError::from)? {
        Some(bytes) => {
            let state = AppState::from_json(&bytes)?;
            debug!(
                bytes = bytes.len(),
                issues = state.store.issues().count(),
                "Loaded state"
            );
            Ok(state)
        }
        None => {
            debug!("No persisted state, starting empty");
            Ok(AppState::default())
        }
    }
}

/// Write the full state to a blob store.
///
/// # Errors
///
/// Returns `StorageError::Serialization` or `StorageError::Blob`.
pub async fn save_state(blobs: &dyn BlobStore, state: &AppState) -> Result<()> {
    let bytes = state.to_json(false)?;
    blobs
        .put(STATE_KEY, &bytes)
        .await
        .map_err(StorageError::from)?;
    debug!(bytes = bytes.len(), "Saved state");
    Ok(())
}
