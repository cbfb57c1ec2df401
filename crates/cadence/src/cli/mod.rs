//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for cadence using clap's
//! derive API.
//!
//! # Commands
//!
//! - `init`: Initialize a new cadence repository
//! - `info`: Show repository and project information
//! - `board`: Show the board columns in order
//! - `issue`: Create, list, show, update, move, delete and comment on issues
//! - `sprint`: Create, start, edit, complete, delete and list sprints
//! - `time`: Start and stop timers, log and edit time, audit counters
//! - `release`: Create, ship, delete and list releases
//! - `theme`: Switch the stored UI theme
//! - `backup`: Export or restore the full state
//! - `apply`: Run JSON commands from a file or stdin
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! cadence issue create "Fix login" --priority high --type bug
//! cadence sprint create --name "Sprint 1"
//! cadence issue move proj-abc --sprint sprint-k3x9 --before proj-def
//! cadence time log proj-abc 1h30m --date 2024-03-15
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    ApplyArgs, BackupAction, BackupArgs, CreateArgs, InitArgs, IssueAction, IssueArgs, ListArgs,
    MoveArgs, ReleaseAction, ReleaseArgs, SprintAction, SprintArgs, ThemeArgs, TimeAction,
    TimeArgs, UpdateArgs,
};
pub use types::{IssueTypeArg, PriorityArg, ThemeArg};
pub use validators::{parse_date, parse_duration, validate_prefix, validate_title};

/// Cadence - sprint planning and time tracking for project boards
///
/// Order issues on a board and across sprints, run sprints through their
/// lifecycle and track time spent. State lives in `.cadence/data/`.
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new cadence repository
    ///
    /// Creates the `.cadence/` directory with configuration and a state blob
    /// seeded with one project, its board and the acting user.
    Init(InitArgs),

    /// Show repository and project information
    Info,

    /// Show the board columns and their issues in order
    Board,

    /// Manage issues
    Issue(IssueArgs),

    /// Manage sprints
    Sprint(SprintArgs),

    /// Track time on issues
    Time(TimeArgs),

    /// Manage releases
    Release(ReleaseArgs),

    /// Switch the UI theme
    Theme(ThemeArgs),

    /// Export or restore a full backup
    Backup(BackupArgs),

    /// Apply JSON commands from a file
    ///
    /// Each command is applied and persisted in turn; the first failure stops
    /// the run.
    Apply(ApplyArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute the parsed command
    ///
    /// # Errors
    ///
    /// Returns the command's error, including a missing repository for every
    /// command except `init`.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Info) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_info(&app, output_mode)
            }
            Some(Commands::Board) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_board(&app, output_mode)
            }
            Some(Commands::Issue(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_issue(&mut app, args, output_mode).await
            }
            Some(Commands::Sprint(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_sprint(&mut app, args, output_mode).await
            }
            Some(Commands::Time(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_time(&mut app, args, output_mode).await
            }
            Some(Commands::Release(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_release(&mut app, args, output_mode).await
            }
            Some(Commands::Theme(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_theme(&mut app, args, output_mode).await
            }
            Some(Commands::Backup(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_backup(&mut app, args, output_mode).await
            }
            Some(Commands::Apply(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_apply(&mut app, args, output_mode).await
            }
            None => {
                println!("Cadence sprint and time tracker");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
