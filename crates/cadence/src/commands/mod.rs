//! Command implementations that work outside an opened tracker.

pub mod init;
