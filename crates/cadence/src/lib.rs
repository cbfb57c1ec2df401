//! Cadence - sprint planning and time tracking for project boards.
//!
//! The library is built around an [`EntityStore`](store::EntityStore) and
//! three components that borrow it for the duration of one command:
//!
//! - [`ordering::OrderingEngine`] keeps issues strictly ordered within their
//!   status column and their sprint or backlog
//! - [`sprint::SprintLifecycle`] runs sprints through
//!   `planned -> active -> completed`
//! - [`time_accounting::TimeAccounting`] records time logs and keeps each
//!   issue's `time_spent` counter in step with them
//!
//! [`tracker::Tracker`] ties them to a persisted blob and is what the CLI
//! drives.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod clock;
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod ordering;
pub mod persistence;
pub mod sprint;
pub mod store;
pub mod time_accounting;
pub mod tracker;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Internal modules (not exposed as public API)
pub(crate) mod app;
pub(crate) mod output;
