//! Domain types for project tracking.
//!
//! This module contains the entities held by the
//! [`EntityStore`](crate::store::EntityStore): issues, sprints, time logs,
//! boards, projects, users and releases, plus the input structs used to
//! create and update them.
//!
//! All entities serialize with camelCase field names, matching the layout of
//! the persisted state blob.

mod ids;
mod sprint;

pub use ids::{BoardId, IssueId, ProjectId, ReleaseId, SprintId, StatusId, TimeLogId, UserId};
pub use sprint::{Sprint, SprintAction, SprintEdit, SprintStatus};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Status id treated as terminal when a project has no board.
pub const DEFAULT_DONE_STATUS: &str = "done";

/// Status id given to new issues when a project has no board.
pub const DEFAULT_INITIAL_STATUS: &str = "todo";

/// Maximum length of an issue title
pub const MAX_TITLE_LENGTH: usize = 200;

/// Kind of entity, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// An [`Issue`]
    Issue,
    /// A [`Sprint`]
    Sprint,
    /// A [`TimeLog`]
    TimeLog,
    /// A [`Project`]
    Project,
    /// A [`User`]
    User,
    /// A [`Board`]
    Board,
    /// A [`Column`] of a board
    Column,
    /// A [`Release`]
    Release,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issue => "Issue",
            Self::Sprint => "Sprint",
            Self::TimeLog => "Time log",
            Self::Project => "Project",
            Self::User => "User",
            Self::Board => "Board",
            Self::Column => "Column",
            Self::Release => "Release",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Issues
// ============================================================================

/// Represents an issue in the tracking system
///
/// An issue belongs to two containers at once: its status column
/// (`status_id`) and its planning container (`sprint_id`, where `None` is the
/// backlog). Each container dimension has its own order field so that a move in
/// one dimension never disturbs the sequence of the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique identifier for the issue
    pub id: IssueId,

    /// Owning project
    pub project_id: ProjectId,

    /// Issue title
    pub title: String,

    /// Issue description
    #[serde(default)]
    pub description: String,

    /// Board column the issue sits in
    pub status_id: StatusId,

    /// Sprint membership; `None` means the issue is in the backlog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<SprintId>,

    /// Release the issue ships in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<ReleaseId>,

    /// Position within the status column
    #[serde(default, alias = "order")]
    pub column_order: u32,

    /// Position within the sprint or backlog
    #[serde(default)]
    pub plan_order: u32,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Issue type
    #[serde(default, rename = "type")]
    pub issue_type: IssueType,

    /// Assigned users
    #[serde(default)]
    pub assignee_ids: BTreeSet<UserId>,

    /// User who reported the issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<UserId>,

    /// Total tracked time in seconds, summed over closed time logs
    #[serde(default)]
    pub time_spent: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Comments in posting order
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Priority of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drop everything
    Highest,
    /// Important
    High,
    /// Normal
    #[default]
    Medium,
    /// Nice to have
    Low,
    /// Someday
    Lowest,
}

/// Type of issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// User-facing story
    Story,
    /// General task
    #[default]
    Task,
    /// Bug fix
    Bug,
    /// Epic (parent issue)
    Epic,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Highest => "highest",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Lowest => "lowest",
        };
        f.write_str(name)
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Story => "story",
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Epic => "epic",
        };
        f.write_str(name)
    }
}

/// A comment on an issue. Comments are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Author of the comment
    pub author_id: UserId,

    /// Comment text
    pub body: String,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    /// Owning project
    pub project_id: ProjectId,

    /// Issue title
    pub title: String,

    /// Issue description
    #[serde(default)]
    pub description: String,

    /// Issue type
    #[serde(default)]
    pub issue_type: IssueType,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Initial column; defaults to the first column of the project board
    #[serde(default)]
    pub status_id: Option<StatusId>,

    /// Initial sprint; defaults to the backlog
    #[serde(default)]
    pub sprint_id: Option<SprintId>,

    /// Assigned users
    #[serde(default)]
    pub assignee_ids: BTreeSet<UserId>,

    /// Reporting user
    #[serde(default)]
    pub reporter_id: Option<UserId>,
}

impl NewIssue {
    /// Validate the new issue data.
    ///
    /// # Errors
    ///
    /// Returns a message if the title is empty or longer than
    /// [`MAX_TITLE_LENGTH`].
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Validate an issue title.
///
/// # Errors
///
/// Returns a message if the title is blank or exceeds [`MAX_TITLE_LENGTH`].
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Data for updating an existing issue
///
/// Container fields are not part of an update: status and sprint changes are
/// moves, performed by
/// [`OrderingEngine::reorder`](crate::ordering::OrderingEngine::reorder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdate {
    /// New title (if updating)
    #[serde(default)]
    pub title: Option<String>,

    /// New description (if updating)
    #[serde(default)]
    pub description: Option<String>,

    /// New priority (if updating)
    #[serde(default)]
    pub priority: Option<Priority>,

    /// New type (if updating)
    #[serde(default)]
    pub issue_type: Option<IssueType>,

    /// New assignee set (if updating)
    #[serde(default)]
    pub assignee_ids: Option<BTreeSet<UserId>>,

    /// New release (if updating, `Some(None)` to clear)
    #[serde(default)]
    pub release_id: Option<Option<ReleaseId>>,
}

// ============================================================================
// Time logs
// ============================================================================

/// A span of tracked work on an issue
///
/// A log with `end_time == None` is an open timer; its duration stays 0 until
/// it is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    /// Unique identifier for the log
    pub id: TimeLogId,

    /// Issue the time was spent on
    pub issue_id: IssueId,

    /// User who spent the time
    pub user_id: UserId,

    /// Start of the span
    pub start_time: DateTime<Utc>,

    /// End of the span; `None` while the timer runs
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Recorded duration in whole seconds
    #[serde(default)]
    pub duration_seconds: u64,
}

impl TimeLog {
    /// Returns `true` while the timer is running
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

// ============================================================================
// Boards, projects, users, releases
// ============================================================================

/// A project board: the ordered set of status columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique identifier for the board
    pub id: BoardId,

    /// Owning project
    pub project_id: ProjectId,

    /// Board name
    pub name: String,

    /// Columns from left to right
    pub columns: Vec<Column>,
}

impl Board {
    /// Find a column by its status id
    pub fn column(&self, status: &StatusId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == status)
    }
}

/// A board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Status id carried by issues in this column
    pub id: StatusId,

    /// Display name
    pub name: String,

    /// Whether issues in this column count as finished work
    #[serde(default)]
    pub done: bool,
}

impl Column {
    /// Create a column
    pub fn new(id: impl Into<String>, name: impl Into<String>, done: bool) -> Self {
        Self {
            id: StatusId::new(id),
            name: name.into(),
            done,
        }
    }
}

/// The default column layout for new boards
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("todo", "To Do", false),
        Column::new("in_progress", "In Progress", false),
        Column::new("done", "Done", true),
    ]
}

/// A project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier for the project
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Short key shown next to issue ids
    #[serde(default)]
    pub key: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A user of the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A release (fix version) grouping issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Unique identifier for the release
    pub id: ReleaseId,

    /// Owning project
    pub project_id: ProjectId,

    /// Release name (e.g., "v1.2.0")
    pub name: String,

    /// Release notes
    #[serde(default)]
    pub description: String,

    /// Planned or actual release date
    #[serde(default)]
    pub release_date: Option<NaiveDate>,

    /// Whether the release has shipped
    #[serde(default)]
    pub released: bool,
}

/// UI theme preference stored in the state blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}
