//! Blob store trait and implementations.

use crate::atomic::write_atomic;
use crate::key::validate_key;
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A key-value store of opaque byte blobs.
///
/// All methods take `&self`; implementations use interior mutability so a
/// store can be shared between an owner that writes and observers that read
/// (for example a test asserting on what was persisted).
///
/// # Errors
///
/// Every method validates the key with [`validate_key`] and returns
/// `Error::InvalidKey` before touching the backend.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing was stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the blob under `key`. Returns `true` if a blob was removed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// List stored keys in ascending order.
    async fn keys(&self) -> Result<Vec<String>>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// Blob store keeping one file per key inside a data directory.
///
/// Writes go through [`write_atomic`], so a blob on disk is always a complete
/// earlier or later version.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "Opened file blob store");
        Ok(Self { root })
    }

    /// Directory holding the blob files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` if the key is not valid.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Leftover temp files are hidden and fail key validation
            if let Some(name) = entry.file_name().to_str()
                && validate_key(name).is_ok()
            {
                keys.push(name.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Blob store held in process memory.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.blobs
            .lock()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.blobs.lock().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.blobs.lock().await.keys().cloned().collect())
    }
}

// ============================================================================
// Test utilities
// ============================================================================

/// In-memory blob store whose writes can be switched to fail.
///
/// Reads always succeed. When failing is enabled, `put` and `remove` return an
/// IO error without modifying the stored blobs.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct FailingBlobStore {
    inner: MemoryBlobStore,
    failing: Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(any(test, feature = "test-util"))]
impl FailingBlobStore {
    /// Create a store that initially accepts writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable write failures. Clones observe the change.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(io::Error::other("injected write failure").into());
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check()?;
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.check()?;
        self.inner.remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }
}
