//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation. Command groups (`issue`, `sprint`, `time`,
//! `release`, `backup`) carry a subcommand enum.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};

use super::types::{IssueTypeArg, PriorityArg, ThemeArg};
use super::validators::{parse_date, parse_duration, validate_prefix, validate_title};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Issue ID prefix (e.g., "proj" for "proj-abc")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Name of the acting user recorded on time logs and comments
    #[arg(short, long)]
    pub user: Option<String>,

    /// Name of the first project
    #[arg(long)]
    pub project: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

// ============================================================================
// Issues
// ============================================================================

/// Arguments for the `issue` command group
#[derive(Parser, Debug, Clone)]
pub struct IssueArgs {
    /// Issue action
    #[command(subcommand)]
    pub action: IssueAction,
}

/// Issue actions
#[derive(Subcommand, Debug, Clone)]
pub enum IssueAction {
    /// Create a new issue at the end of its column and of the backlog or sprint
    Create(CreateArgs),

    /// List issues in container order
    List(ListArgs),

    /// Show issue details
    Show {
        /// Issue ID to display
        issue_id: String,
    },

    /// Update an issue's plain fields
    Update(UpdateArgs),

    /// Move an issue to a column, a sprint or the backlog
    Move(MoveArgs),

    /// Delete an issue and its time logs
    Delete {
        /// Issue ID to delete
        issue_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Comment on an issue
    Comment {
        /// Issue ID to comment on
        issue_id: String,

        /// Comment text
        body: String,
    },
}

/// Arguments for `issue create`
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Issue title (maximum 200 characters)
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Detailed description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Priority level
    #[arg(short, long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,

    /// Issue type
    #[arg(short = 't', long = "type", value_enum, default_value = "task")]
    pub issue_type: IssueTypeArg,

    /// Initial column (defaults to the first column of the board)
    #[arg(short, long)]
    pub column: Option<String>,

    /// Initial sprint (defaults to the backlog)
    #[arg(short, long)]
    pub sprint: Option<String>,

    /// Assignees (comma-separated user IDs)
    #[arg(short, long, value_delimiter = ',')]
    pub assignees: Vec<String>,
}

/// Arguments for `issue list`
#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("container").args(["column", "sprint", "backlog"])))]
pub struct ListArgs {
    /// Only issues in this column, in column order
    #[arg(short, long)]
    pub column: Option<String>,

    /// Only issues in this sprint, in plan order
    #[arg(short, long)]
    pub sprint: Option<String>,

    /// Only backlog issues, in plan order
    #[arg(short, long)]
    pub backlog: bool,

    /// Maximum number of issues to display
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

/// Arguments for `issue update`
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Issue ID to update
    pub issue_id: String,

    /// New title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// New priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// New issue type
    #[arg(short = 't', long = "type", value_enum)]
    pub issue_type: Option<IssueTypeArg>,

    /// Replace the assignees (comma-separated, empty to clear)
    #[arg(short, long, value_delimiter = ',', num_args = 0..)]
    pub assignees: Option<Vec<String>>,

    /// Attach the issue to a release
    #[arg(long, conflicts_with = "clear_release")]
    pub release: Option<String>,

    /// Detach the issue from its release
    #[arg(long)]
    pub clear_release: bool,
}

/// Arguments for `issue move`
#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("destination")
        .required(true)
        .args(["column", "sprint", "backlog"])
))]
pub struct MoveArgs {
    /// Issue ID to move
    pub issue_id: String,

    /// Target column (status) on the board
    #[arg(short, long)]
    pub column: Option<String>,

    /// Target sprint
    #[arg(short, long)]
    pub sprint: Option<String>,

    /// Move to the backlog
    #[arg(short, long)]
    pub backlog: bool,

    /// Place before this issue (defaults to the end)
    #[arg(long)]
    pub before: Option<String>,
}

// ============================================================================
// Sprints
// ============================================================================

/// Arguments for the `sprint` command group
#[derive(Parser, Debug, Clone)]
pub struct SprintArgs {
    /// Sprint action
    #[command(subcommand)]
    pub action: SprintAction,
}

/// Sprint actions
#[derive(Subcommand, Debug, Clone)]
pub enum SprintAction {
    /// Create a planned sprint
    Create {
        /// Sprint name (defaults to "Sprint N")
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Start a planned sprint
    Start {
        /// Sprint ID
        sprint_id: String,

        /// First day (defaults to today)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day (defaults to two weeks after the first day)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Sprint goal
        #[arg(short, long, default_value = "")]
        goal: String,
    },

    /// Edit a planned or active sprint
    Edit {
        /// Sprint ID
        sprint_id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New first day
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// New last day
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// New goal
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Complete the active sprint, returning unfinished issues to the backlog
    Complete {
        /// Sprint ID
        sprint_id: String,
    },

    /// Delete a sprint, returning its issues to the backlog
    Delete {
        /// Sprint ID
        sprint_id: String,
    },

    /// List sprints of the current project
    List {
        /// Include completed sprints
        #[arg(short, long)]
        all: bool,
    },
}

// ============================================================================
// Time tracking
// ============================================================================

/// Arguments for the `time` command group
#[derive(Parser, Debug, Clone)]
pub struct TimeArgs {
    /// Time tracking action
    #[command(subcommand)]
    pub action: TimeAction,
}

/// Time tracking actions
#[derive(Subcommand, Debug, Clone)]
pub enum TimeAction {
    /// Start a timer on an issue, stopping any running timer
    Start {
        /// Issue ID
        issue_id: String,
    },

    /// Stop a timer (defaults to your running timer)
    Stop {
        /// Time log ID
        log_id: Option<String>,
    },

    /// Log time spent without a timer
    Log {
        /// Issue ID
        issue_id: String,

        /// Duration, e.g. 1h30m, 45m or 5400
        #[arg(value_parser = parse_duration)]
        duration: u64,

        /// Day the work happened (defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Overwrite a log's duration and day
    Edit {
        /// Time log ID
        log_id: String,

        /// New duration, e.g. 1h30m, 45m or 5400
        #[arg(value_parser = parse_duration)]
        duration: u64,

        /// New day (defaults to the log's current day)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Delete a time log
    Delete {
        /// Time log ID
        log_id: String,
    },

    /// List time logs
    List {
        /// Only logs for this issue
        #[arg(short, long)]
        issue: Option<String>,
    },

    /// Report issues whose time spent disagrees with their logs
    Audit,
}

// ============================================================================
// Releases, settings and backups
// ============================================================================

/// Arguments for the `release` command group
#[derive(Parser, Debug, Clone)]
pub struct ReleaseArgs {
    /// Release action
    #[command(subcommand)]
    pub action: ReleaseAction,
}

/// Release actions
#[derive(Subcommand, Debug, Clone)]
pub enum ReleaseAction {
    /// Create a release
    Create {
        /// Release name
        name: String,

        /// Release notes
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Planned release date
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Mark a release as shipped
    Ship {
        /// Release ID
        release_id: String,
    },

    /// Delete a release, detaching its issues
    Delete {
        /// Release ID
        release_id: String,
    },

    /// List releases of the current project
    List,
}

/// Arguments for the `theme` command
#[derive(Parser, Debug, Clone)]
pub struct ThemeArgs {
    /// Theme to switch to
    #[arg(value_enum)]
    pub theme: ThemeArg,
}

/// Arguments for the `backup` command group
#[derive(Parser, Debug, Clone)]
pub struct BackupArgs {
    /// Backup action
    #[command(subcommand)]
    pub action: BackupAction,
}

/// Backup actions
#[derive(Subcommand, Debug, Clone)]
pub enum BackupAction {
    /// Write the full state as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the full state with a backup file
    Restore {
        /// Backup file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `apply` command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// File with one JSON command or an array of them ("-" for stdin)
    pub file: PathBuf,
}
