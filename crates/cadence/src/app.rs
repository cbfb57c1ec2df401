//! Application context for CLI command execution.
//!
//! [`App`] locates the `.cadence/` directory, reads its configuration and
//! opens a [`Tracker`] over the configured blob store.
//!
//! # Example
//!
//! ```ignore
//! let mut app = App::from_directory(Path::new(".")).await?;
//! let project = app.tracker().current_project()?;
//! ```

use crate::clock::SystemClock;
use crate::commands::init::{find_cadence_root, CadenceConfig, CADENCE_DIR_NAME, CONFIG_FILE_NAME};
use crate::domain::UserId;
use crate::error::{ConfigError, Result};
use crate::persistence::open_blob_store;
use crate::tracker::Tracker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Application context for CLI operations.
pub struct App {
    tracker: Tracker,

    /// Path to the cadence directory (.cadence)
    cadence_dir: PathBuf,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("cadence_dir", &self.cadence_dir)
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for a `.cadence/` directory, loads its
    /// configuration and the persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No cadence repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The persisted state cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_cadence_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let cadence_dir = root_dir.join(CADENCE_DIR_NAME);
        let config = CadenceConfig::load(&cadence_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        debug!(?backend, user = %config.user, "Opening tracker");
        let blobs = open_blob_store(backend).await?;
        let tracker = Tracker::open(
            blobs,
            Arc::new(SystemClock),
            UserId::new(config.user),
            config.issue_prefix,
        )
        .await?;

        Ok(Self {
            tracker,
            cadence_dir,
        })
    }

    /// The tracker, for read-only commands
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// The tracker, for mutating commands
    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    /// Get the path to the cadence directory.
    pub fn cadence_dir(&self) -> &Path {
        &self.cadence_dir
    }
}
