//! Implementation of the `init` command.
//!
//! This module handles initialization of a new cadence repository, creating
//! the `.cadence/` directory with its configuration and a seeded state blob.

use crate::domain::{User, UserId, default_columns};
use crate::error::{ConfigError, Result};
use crate::persistence::{StorageBackend, open_blob_store, save_state};
use crate::store::AppState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Default issue prefix if none specified
pub const DEFAULT_PREFIX: &str = "proj";

/// Default acting user if none specified
pub const DEFAULT_USER: &str = "me";

/// Default name of the seeded project
pub const DEFAULT_PROJECT_NAME: &str = "My Project";

/// Name of the cadence directory
pub const CADENCE_DIR_NAME: &str = ".cadence";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the data directory within .cadence
pub const DATA_DIR_NAME: &str = "data";

/// Name of the gitignore file within .cadence
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for cadence root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CadenceConfig {
    /// Issue ID prefix (e.g., "proj" for "proj-abc")
    #[serde(rename = "issue-prefix")]
    pub issue_prefix: String,

    /// Acting user for timers and comments
    pub user: String,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type ("file" or "memory")
    pub backend: String,

    /// Data directory, relative to the repository root
    pub data_dir: String,
}

impl StorageConfig {
    /// Resolve the configured backend against the repository root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognized backend.
    pub fn to_backend(&self, root: &Path) -> Result<StorageBackend> {
        match self.backend.as_str() {
            "file" => Ok(StorageBackend::File(root.join(&self.data_dir))),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl CadenceConfig {
    /// Create a new configuration with the given prefix and user
    pub fn new(prefix: &str, user: &str) -> Self {
        Self {
            issue_prefix: prefix.to_string(),
            user: user.to_string(),
            storage: StorageConfig {
                backend: "file".to_string(),
                data_dir: format!("{CADENCE_DIR_NAME}/{DATA_DIR_NAME}"),
            },
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an IO error or `ConfigError::Parse`.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an IO error or `ConfigError::Parse`.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_USER)
    }
}

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions<'a> {
    /// Issue ID prefix (defaults to "proj")
    pub prefix: Option<&'a str>,
    /// Acting user (defaults to "me")
    pub user: Option<&'a str>,
    /// Name of the seeded project
    pub project: Option<&'a str>,
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created cadence directory
    pub cadence_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data directory
    pub data_dir: PathBuf,
    /// The prefix used for issue IDs
    pub prefix: String,
    /// The seeded user
    pub user: UserId,
    /// Name of the seeded project
    pub project: String,
}

/// Validate issue ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - Alphanumeric only (letters and digits)
///
/// Note: Expects pre-trimmed input.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix must be at least {MIN_PREFIX_LENGTH} characters"
        ))
        .into());
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix cannot exceed {MAX_PREFIX_LENGTH} characters"
        ))
        .into());
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPrefix(
            "Prefix must contain only alphanumeric characters".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Initialize a new cadence repository in the given directory.
///
/// Seeds the state with one project, its default board and the acting user.
///
/// # Errors
///
/// Returns an error if:
/// - The `.cadence/` directory already exists
/// - The prefix or user is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, options: InitOptions<'_>) -> Result<InitResult> {
    let prefix = options.prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let user = options.user.unwrap_or(DEFAULT_USER).trim();
    if user.is_empty() {
        return Err(ConfigError::Parse("User name cannot be empty".to_string()).into());
    }
    let project_name = options.project.unwrap_or(DEFAULT_PROJECT_NAME).trim();

    let cadence_dir = base_dir.join(CADENCE_DIR_NAME);
    if cadence_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(CADENCE_DIR_NAME.to_string()).into());
    }

    fs::create_dir_all(&cadence_dir).await?;

    let config_file = cadence_dir.join(CONFIG_FILE_NAME);
    let config = CadenceConfig::new(prefix, user);
    config.save(&config_file).await?;

    let gitignore_content = "\
# Cadence writes state atomically through temporary files
data/*.tmp
";
    fs::write(cadence_dir.join(GITIGNORE_FILE_NAME), gitignore_content).await?;

    let data_dir = base_dir.join(&config.storage.data_dir);
    let blobs = open_blob_store(StorageBackend::File(data_dir.clone())).await?;
    let state = seed_state(prefix, user, project_name)?;
    save_state(blobs.as_ref(), &state).await?;

    info!(prefix, user, project = project_name, "Initialized cadence repository");
    Ok(InitResult {
        cadence_dir,
        config_file,
        data_dir,
        prefix: prefix.to_string(),
        user: UserId::new(user),
        project: project_name.to_string(),
    })
}

fn seed_state(prefix: &str, user: &str, project_name: &str) -> Result<AppState> {
    let now = Utc::now();
    let mut state = AppState::default();

    let project = state
        .store
        .create_project(project_name, &prefix.to_ascii_uppercase(), now)?;
    state.store.create_board(
        &project.id,
        &format!("{project_name} board"),
        default_columns(),
        now,
    )?;
    state.store.insert_user(User {
        id: UserId::new(user),
        name: user.to_string(),
        email: None,
    });
    state.current_project_id = Some(project.id);
    state.authenticated = true;

    Ok(state)
}

/// Check if a directory has been initialized with cadence.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(CADENCE_DIR_NAME).exists()
}

/// Find the cadence root directory by searching up the directory tree.
///
/// Returns `Some(path)` with the directory containing `.cadence/`, or `None`
/// if no repository is found within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_cadence_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(CADENCE_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
