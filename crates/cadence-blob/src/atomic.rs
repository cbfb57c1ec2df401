//! Atomic file writes.
//!
//! Blobs are written with the temp-file-then-rename pattern:
//!
//! 1. The bytes are written to a hidden sibling file named `.{name}.tmp`
//! 2. The temporary file is flushed and synced to disk
//! 3. The temporary file is renamed over the target path
//!
//! Renames within one filesystem are atomic on POSIX systems, so readers see
//! either the previous blob or the new one, never a torn write. A crash during
//! steps 1 or 2 may leave the `.tmp` file behind; the next successful write
//! replaces it.

use crate::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Atomically replace the contents of `path` with `bytes`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or if
/// the final rename fails (e.g., cross-filesystem move). On failure the
/// original file, if any, is left unchanged and the temporary file is removed
/// on a best-effort basis.
pub async fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, bytes).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    tracing::trace!(path = %path.display(), len = bytes.len(), "Blob written");

    Ok(())
}

/// Build the temp path `.{name}.tmp` next to `path`.
///
/// The leading dot keeps the name outside the valid key space, so a temp
/// file can never alias a stored blob.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_to_temp_file(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}
