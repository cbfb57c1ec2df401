//! Blob key validation.
//!
//! Keys double as file names for [`FileBlobStore`](crate::FileBlobStore), so
//! they are restricted to a conservative character set that cannot escape the
//! data directory.

use crate::{Error, Result};

/// Maximum key length in bytes
pub const MAX_KEY_LENGTH: usize = 128;

/// Validate a blob key.
///
/// Requirements:
/// - 1-128 characters
/// - ASCII alphanumerics, `-`, `_` and `.` only
/// - Must not start with `.`
///
/// # Errors
///
/// Returns `Error::InvalidKey` describing the first violated rule.
pub fn validate_key(key: &str) -> Result<()> {
    let reject = |reason| {
        Err(Error::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return reject("key cannot be empty");
    }

    if key.len() > MAX_KEY_LENGTH {
        return reject("key cannot exceed 128 characters");
    }

    if key.starts_with('.') {
        return reject("key cannot start with '.'");
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return reject("key may only contain alphanumerics, '-', '_' and '.'");
    }

    Ok(())
}
