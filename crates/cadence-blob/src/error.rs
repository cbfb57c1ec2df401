//! Error types for cadence-blob operations.

use std::io;
use thiserror::Error;

/// The error type for cadence-blob operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing a blob.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The key cannot be used to address a blob.
    #[error("Invalid blob key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why the key was rejected
        reason: &'static str,
    },
}

/// A specialized Result type for cadence-blob operations.
pub type Result<T> = std::result::Result<T, Error>;
