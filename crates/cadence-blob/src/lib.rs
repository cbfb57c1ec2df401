//! Key-value blob persistence for cadence.
//!
//! This library provides a small async [`BlobStore`] abstraction over opaque
//! byte values addressed by string keys, with two implementations:
//!
//! - [`FileBlobStore`]: one file per key inside a data directory, written
//!   atomically (temp file, flush, rename)
//! - [`MemoryBlobStore`]: a shared in-process map, useful for tests and
//!   ephemeral sessions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod key;
pub mod store;

pub use atomic::write_atomic;
pub use error::{Error, Result};
pub use key::validate_key;
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};

#[cfg(any(test, feature = "test-util"))]
pub use store::FailingBlobStore;
