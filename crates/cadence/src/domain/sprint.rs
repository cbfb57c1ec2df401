//! Sprint entity and its lifecycle states.

use super::{ProjectId, SprintId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a sprint
///
/// Transitions run `Planned -> Active -> Completed`; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    /// Created, not yet started; no dates assigned
    #[default]
    Planned,
    /// Started and in progress
    Active,
    /// Finished; unfinished work has returned to the backlog
    Completed,
}

impl SprintStatus {
    /// Map the legacy `isActive`/`isCompleted` flag pair onto a status.
    ///
    /// The contradictory pair (both set) resolves to `Completed`, since
    /// completion is terminal.
    pub fn from_flags(is_active: bool, is_completed: bool) -> Self {
        match (is_active, is_completed) {
            (_, true) => Self::Completed,
            (true, false) => Self::Active,
            (false, false) => Self::Planned,
        }
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A lifecycle operation on a sprint, used in transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintAction {
    /// `start`
    Start,
    /// `edit`
    Edit,
    /// `complete`
    Complete,
    /// Planning an issue into the sprint
    Plan,
}

impl fmt::Display for SprintAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Edit => "edit",
            Self::Complete => "complete",
            Self::Plan => "plan issues into",
        };
        f.write_str(name)
    }
}

/// A time-boxed iteration of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SprintRecord")]
pub struct Sprint {
    /// Unique identifier for the sprint
    pub id: SprintId,

    /// Owning project
    pub project_id: ProjectId,

    /// Sprint name
    pub name: String,

    /// Sprint goal
    pub goal: String,

    /// First day of the sprint, assigned on start
    pub start_date: Option<NaiveDate>,

    /// Last day of the sprint, assigned on start
    pub end_date: Option<NaiveDate>,

    /// Lifecycle state
    pub status: SprintStatus,

    /// When the sprint was completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Replacement values for a sprint's editable fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintEdit {
    /// New name
    pub name: String,
    /// New start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New end date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New goal
    #[serde(default)]
    pub goal: String,
}

/// Serialized sprint shape, accepting both the status enum and the legacy
/// boolean flags.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SprintRecord {
    id: SprintId,
    project_id: ProjectId,
    name: String,
    #[serde(default)]
    goal: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    status: Option<SprintStatus>,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl From<SprintRecord> for Sprint {
    fn from(record: SprintRecord) -> Self {
        let status = record
            .status
            .unwrap_or_else(|| SprintStatus::from_flags(record.is_active, record.is_completed));

        Self {
            id: record.id,
            project_id: record.project_id,
            name: record.name,
            goal: record.goal,
            start_date: record.start_date,
            end_date: record.end_date,
            status,
            completed_at: record.completed_at,
        }
    }
}
