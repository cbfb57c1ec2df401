//! Serializable command intents and their outcomes.

use crate::domain::{
    Issue, IssueId, IssueUpdate, NewIssue, ProjectId, Release, ReleaseId, Sprint, SprintId,
    Theme, TimeLog, TimeLogId,
};
use crate::ordering::{Anchor, Destination};
use crate::sprint::CompletionReport;
use crate::time_accounting::TimerStart;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single mutation of the tracker state.
///
/// Commands are plain data. [`Tracker::execute`](super::Tracker::execute)
/// applies one to completion and persists the result before the next is
/// accepted.
///
/// Serialized with a `type` tag, e.g.
/// `{"type": "reorder", "issueId": "proj-a1b2", "destination": {"kind": "backlog"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Move an issue within or between containers
    Reorder {
        /// Issue to move
        issue_id: IssueId,
        /// Target container
        destination: Destination,
        /// Insertion point, defaulting to the end
        #[serde(default)]
        anchor: Anchor,
    },

    /// Create a planned sprint
    CreateSprint {
        /// Owning project, defaulting to the current project
        #[serde(default)]
        project_id: Option<ProjectId>,
        /// Sprint name, defaulting to `Sprint N`
        #[serde(default)]
        name: Option<String>,
    },

    /// Start a planned sprint
    StartSprint {
        /// Sprint to start
        sprint_id: SprintId,
        /// First day
        start_date: NaiveDate,
        /// Last day
        end_date: NaiveDate,
        /// Sprint goal
        #[serde(default)]
        goal: String,
    },

    /// Rewrite a sprint's fields
    EditSprint {
        /// Sprint to edit
        sprint_id: SprintId,
        /// New name
        name: String,
        /// New first day
        #[serde(default)]
        start_date: Option<NaiveDate>,
        /// New last day
        #[serde(default)]
        end_date: Option<NaiveDate>,
        /// New goal
        #[serde(default)]
        goal: String,
    },

    /// Complete an active sprint
    CompleteSprint {
        /// Sprint to complete
        sprint_id: SprintId,
    },

    /// Delete a sprint
    DeleteSprint {
        /// Sprint to delete
        sprint_id: SprintId,
    },

    /// Start a timer for the acting user
    StartTimeLog {
        /// Issue to track
        issue_id: IssueId,
    },

    /// Stop a running timer
    StopTimeLog {
        /// Log to stop
        log_id: TimeLogId,
    },

    /// Record a closed span for the acting user
    LogManualTime {
        /// Issue the time was spent on
        issue_id: IssueId,
        /// Duration in seconds
        seconds: u64,
        /// Day the work happened
        date: NaiveDate,
    },

    /// Overwrite a log's duration and date
    EditTimeLog {
        /// Log to edit
        log_id: TimeLogId,
        /// New duration in seconds
        seconds: u64,
        /// New day
        date: NaiveDate,
    },

    /// Delete a time log
    DeleteTimeLog {
        /// Log to delete
        log_id: TimeLogId,
    },

    /// Create an issue
    CreateIssue {
        /// Issue data
        issue: NewIssue,
    },

    /// Update an issue's plain fields
    UpdateIssue {
        /// Issue to update
        issue_id: IssueId,
        /// Fields to change
        updates: IssueUpdate,
    },

    /// Delete an issue and its time logs
    DeleteIssue {
        /// Issue to delete
        issue_id: IssueId,
    },

    /// Comment on an issue as the acting user
    AddComment {
        /// Issue to comment on
        issue_id: IssueId,
        /// Comment text
        body: String,
    },

    /// Create a release
    CreateRelease {
        /// Owning project, defaulting to the current project
        #[serde(default)]
        project_id: Option<ProjectId>,
        /// Release name
        name: String,
        /// Release notes
        #[serde(default)]
        description: String,
        /// Planned date
        #[serde(default)]
        release_date: Option<NaiveDate>,
    },

    /// Mark a release as shipped
    ReleaseVersion {
        /// Release to ship
        release_id: ReleaseId,
    },

    /// Delete a release
    DeleteRelease {
        /// Release to delete
        release_id: ReleaseId,
    },

    /// Switch the UI theme
    SetTheme {
        /// New theme
        theme: Theme,
    },

    /// Replace the whole state with a backup
    Restore {
        /// Backup JSON document
        backup: String,
    },
}

impl Command {
    /// Name of the command as it appears in the `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reorder { .. } => "reorder",
            Self::CreateSprint { .. } => "createSprint",
            Self::StartSprint { .. } => "startSprint",
            Self::EditSprint { .. } => "editSprint",
            Self::CompleteSprint { .. } => "completeSprint",
            Self::DeleteSprint { .. } => "deleteSprint",
            Self::StartTimeLog { .. } => "startTimeLog",
            Self::StopTimeLog { .. } => "stopTimeLog",
            Self::LogManualTime { .. } => "logManualTime",
            Self::EditTimeLog { .. } => "editTimeLog",
            Self::DeleteTimeLog { .. } => "deleteTimeLog",
            Self::CreateIssue { .. } => "createIssue",
            Self::UpdateIssue { .. } => "updateIssue",
            Self::DeleteIssue { .. } => "deleteIssue",
            Self::AddComment { .. } => "addComment",
            Self::CreateRelease { .. } => "createRelease",
            Self::ReleaseVersion { .. } => "releaseVersion",
            Self::DeleteRelease { .. } => "deleteRelease",
            Self::SetTheme { .. } => "setTheme",
            Self::Restore { .. } => "restore",
        }
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Outcome {
    /// Destination container in its final order
    Reordered(Vec<IssueId>),
    /// A created, started or edited sprint
    Sprint(Sprint),
    /// Result of completing a sprint
    SprintCompleted(CompletionReport),
    /// Issues returned to the backlog by a sprint deletion
    SprintDeleted(Vec<IssueId>),
    /// A newly opened timer
    TimerStarted(TimerStart),
    /// A stopped, logged, edited or deleted time log
    TimeLog(TimeLog),
    /// A created, updated, commented or deleted issue
    Issue(Box<Issue>),
    /// A created, shipped or deleted release
    Release(Release),
    /// The new theme
    Theme(Theme),
    /// Entity counts of a restored backup
    Restored {
        /// Number of issues restored
        issues: usize,
        /// Number of sprints restored
        sprints: usize,
    },
}
