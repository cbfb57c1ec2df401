//! Normalized in-memory entity storage.
//!
//! [`EntityStore`] is the single owner of every entity. It holds one ordered
//! map per entity kind and applies no business policy of its own beyond
//! referential checks; the ordering engine, sprint lifecycle and time
//! accounting components borrow it mutably and rewrite records in place.
//!
//! # Containers
//!
//! Issues are grouped into containers along two independent dimensions:
//!
//! - **Column**: same `(project_id, status_id)`, sequenced by `column_order`
//! - **Plan**: same `(project_id, sprint_id)` where `None` is the backlog,
//!   sequenced by `plan_order`
//!
//! Container queries return members sorted by their order field, with the
//! issue id as a tie-breaker so the sequence is total even for data restored
//! from older blobs.
//!
//! # Determinism
//!
//! Maps are `BTreeMap`s so the serialized state is stable across saves.

mod records;
mod state;

pub use state::{AppState, REQUIRED_BACKUP_KEYS};

use crate::domain::{
    Board, BoardId, DEFAULT_DONE_STATUS, DEFAULT_INITIAL_STATUS, EntityKind, Issue, IssueId,
    Project, ProjectId, Release, ReleaseId, Sprint, SprintId, SprintStatus, StatusId, TimeLog,
    TimeLogId, User, UserId,
};
use crate::error::{Error, Result};
use crate::id_generation::IdGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized storage for all tracker entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStore {
    #[serde(default)]
    pub(crate) projects: BTreeMap<ProjectId, Project>,

    #[serde(default)]
    pub(crate) users: BTreeMap<UserId, User>,

    #[serde(default)]
    pub(crate) issues: BTreeMap<IssueId, Issue>,

    #[serde(default)]
    pub(crate) sprints: BTreeMap<SprintId, Sprint>,

    #[serde(default)]
    pub(crate) boards: BTreeMap<BoardId, Board>,

    #[serde(default)]
    pub(crate) time_logs: BTreeMap<TimeLogId, TimeLog>,

    #[serde(default)]
    pub(crate) releases: BTreeMap<ReleaseId, Release>,

    /// Collision tracking for new ids. Rebuilt by [`EntityStore::reindex`].
    #[serde(skip)]
    pub(crate) ids: IdGenerator,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every stored id with the id generator.
    ///
    /// Must run after deserializing a store so new ids cannot collide with
    /// loaded ones.
    pub fn reindex(&mut self) {
        self.ids.clear_state();
        let ids = self
            .projects
            .keys()
            .map(|id| id.0.clone())
            .chain(self.users.keys().map(|id| id.0.clone()))
            .chain(self.issues.keys().map(|id| id.0.clone()))
            .chain(self.sprints.keys().map(|id| id.0.clone()))
            .chain(self.boards.keys().map(|id| id.0.clone()))
            .chain(self.time_logs.keys().map(|id| id.0.clone()))
            .chain(self.releases.keys().map(|id| id.0.clone()))
            .collect::<Vec<_>>();
        for id in ids {
            self.ids.register_id(id);
        }
    }

    /// Generate a fresh id with the given prefix.
    pub(crate) fn generate_id(
        &mut self,
        prefix: &str,
        seed: &[&str],
        now: DateTime<Utc>,
    ) -> Result<String> {
        Ok(self.ids.generate(prefix, seed, now.timestamp())?)
    }

    /// Use up every id `generate_id` could return for this input.
    #[cfg(test)]
    pub(crate) fn exhaust_ids(&mut self, prefix: &str, seed: &[&str], now: DateTime<Utc>) {
        while self.generate_id(prefix, seed, now).is_ok() {}
    }

    // ========== Lookups ==========

    /// Get a project by id
    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.get(id)
    }

    /// All projects in id order
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Get a user by id
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// All users in id order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Get an issue by id
    pub fn issue(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.get(id)
    }

    /// Get a mutable issue by id
    pub fn issue_mut(&mut self, id: &IssueId) -> Option<&mut Issue> {
        self.issues.get_mut(id)
    }

    /// All issues in id order
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    /// Get a sprint by id
    pub fn sprint(&self, id: &SprintId) -> Option<&Sprint> {
        self.sprints.get(id)
    }

    /// Get a mutable sprint by id
    pub fn sprint_mut(&mut self, id: &SprintId) -> Option<&mut Sprint> {
        self.sprints.get_mut(id)
    }

    /// All sprints in id order
    pub fn sprints(&self) -> impl Iterator<Item = &Sprint> {
        self.sprints.values()
    }

    /// Get a time log by id
    pub fn time_log(&self, id: &TimeLogId) -> Option<&TimeLog> {
        self.time_logs.get(id)
    }

    /// Get a mutable time log by id
    pub fn time_log_mut(&mut self, id: &TimeLogId) -> Option<&mut TimeLog> {
        self.time_logs.get_mut(id)
    }

    /// All time logs in id order
    pub fn time_logs(&self) -> impl Iterator<Item = &TimeLog> {
        self.time_logs.values()
    }

    /// Get a release by id
    pub fn release(&self, id: &ReleaseId) -> Option<&Release> {
        self.releases.get(id)
    }

    /// All releases in id order
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    /// The board of a project, if it has one
    pub fn board_for_project(&self, project: &ProjectId) -> Option<&Board> {
        self.boards.values().find(|b| &b.project_id == project)
    }

    /// Get an issue or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no issue has this id.
    pub fn require_issue(&self, id: &IssueId) -> Result<&Issue> {
        self.issues
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Issue, id))
    }

    /// Get a mutable issue or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no issue has this id.
    pub fn require_issue_mut(&mut self, id: &IssueId) -> Result<&mut Issue> {
        self.issues
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Issue, id))
    }

    /// Get a sprint or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no sprint has this id.
    pub fn require_sprint(&self, id: &SprintId) -> Result<&Sprint> {
        self.sprints
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Sprint, id))
    }

    /// Get a mutable sprint or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no sprint has this id.
    pub fn require_sprint_mut(&mut self, id: &SprintId) -> Result<&mut Sprint> {
        self.sprints
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Sprint, id))
    }

    /// Get a time log or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no log has this id.
    pub fn require_time_log(&self, id: &TimeLogId) -> Result<&TimeLog> {
        self.time_logs
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::TimeLog, id))
    }

    /// Get a mutable time log or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no log has this id.
    pub fn require_time_log_mut(&mut self, id: &TimeLogId) -> Result<&mut TimeLog> {
        self.time_logs
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::TimeLog, id))
    }

    /// Get a project or fail with `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no project has this id.
    pub fn require_project(&self, id: &ProjectId) -> Result<&Project> {
        self.projects
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Project, id))
    }

    // ========== Raw placement ==========

    /// Insert or replace a user
    pub fn insert_user(&mut self, user: User) {
        self.ids.register_id(user.id.0.clone());
        self.users.insert(user.id.clone(), user);
    }

    /// Insert or replace a sprint record
    pub fn insert_sprint(&mut self, sprint: Sprint) {
        self.ids.register_id(sprint.id.0.clone());
        self.sprints.insert(sprint.id.clone(), sprint);
    }

    /// Remove a sprint record without touching its issues
    pub(crate) fn remove_sprint(&mut self, id: &SprintId) -> Option<Sprint> {
        self.sprints.remove(id)
    }

    /// Insert or replace a time log record
    pub fn insert_time_log(&mut self, log: TimeLog) {
        self.ids.register_id(log.id.0.clone());
        self.time_logs.insert(log.id.clone(), log);
    }

    /// Remove a time log record without touching its issue's counter
    pub(crate) fn remove_time_log(&mut self, id: &TimeLogId) -> Option<TimeLog> {
        self.time_logs.remove(id)
    }

    // ========== Containers ==========

    /// Issues in a status column, in column order
    pub fn column_members(&self, project: &ProjectId, status: &StatusId) -> Vec<IssueId> {
        let mut members: Vec<&Issue> = self
            .issues
            .values()
            .filter(|i| &i.project_id == project && &i.status_id == status)
            .collect();
        members.sort_by(|a, b| a.column_order.cmp(&b.column_order).then_with(|| a.id.cmp(&b.id)));
        members.into_iter().map(|i| i.id.clone()).collect()
    }

    /// Issues in a sprint (or the backlog when `sprint` is `None`), in plan order
    pub fn plan_members(&self, project: &ProjectId, sprint: Option<&SprintId>) -> Vec<IssueId> {
        let mut members: Vec<&Issue> = self
            .issues
            .values()
            .filter(|i| &i.project_id == project && i.sprint_id.as_ref() == sprint)
            .collect();
        members.sort_by(|a, b| a.plan_order.cmp(&b.plan_order).then_with(|| a.id.cmp(&b.id)));
        members.into_iter().map(|i| i.id.clone()).collect()
    }

    /// Issues tagged to a sprint in any project, in plan order
    pub fn sprint_members(&self, sprint: &SprintId) -> Vec<IssueId> {
        let mut members: Vec<&Issue> = self
            .issues
            .values()
            .filter(|i| i.sprint_id.as_ref() == Some(sprint))
            .collect();
        members.sort_by(|a, b| a.plan_order.cmp(&b.plan_order).then_with(|| a.id.cmp(&b.id)));
        members.into_iter().map(|i| i.id.clone()).collect()
    }

    /// Order value that appends to the end of a status column
    pub fn next_column_order(&self, project: &ProjectId, status: &StatusId) -> u32 {
        self.issues
            .values()
            .filter(|i| &i.project_id == project && &i.status_id == status)
            .map(|i| i.column_order.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Order value that appends to the end of a sprint or the backlog
    pub fn next_plan_order(&self, project: &ProjectId, sprint: Option<&SprintId>) -> u32 {
        self.issues
            .values()
            .filter(|i| &i.project_id == project && i.sprint_id.as_ref() == sprint)
            .map(|i| i.plan_order.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    // ========== Board semantics ==========

    /// Whether a status counts as finished work in a project.
    ///
    /// Uses the `done` flag of the project's board column. Projects without a
    /// board treat [`DEFAULT_DONE_STATUS`] as terminal.
    pub fn is_done_status(&self, project: &ProjectId, status: &StatusId) -> bool {
        match self.board_for_project(project) {
            Some(board) => board.column(status).is_some_and(|c| c.done),
            None => status.as_str() == DEFAULT_DONE_STATUS,
        }
    }

    /// Status given to new issues: the first board column, or
    /// [`DEFAULT_INITIAL_STATUS`] without a board.
    pub fn initial_status(&self, project: &ProjectId) -> StatusId {
        self.board_for_project(project)
            .and_then(|b| b.columns.first())
            .map_or_else(|| StatusId::new(DEFAULT_INITIAL_STATUS), |c| c.id.clone())
    }

    /// Check that a status names a column of the project's board.
    ///
    /// Any status is accepted for projects without a board.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for a column missing from the board.
    pub fn validate_status(&self, project: &ProjectId, status: &StatusId) -> Result<()> {
        match self.board_for_project(project) {
            Some(board) if board.column(status).is_none() => {
                Err(Error::not_found(EntityKind::Column, status))
            }
            _ => Ok(()),
        }
    }

    /// Active sprints of a project
    pub fn active_sprints(&self, project: &ProjectId) -> Vec<&Sprint> {
        self.sprints
            .values()
            .filter(|s| &s.project_id == project && s.status == SprintStatus::Active)
            .collect()
    }

    // ========== Time logs ==========

    /// Logs recorded against an issue, oldest first
    pub fn logs_for_issue(&self, issue: &IssueId) -> Vec<&TimeLog> {
        let mut logs: Vec<&TimeLog> = self
            .time_logs
            .values()
            .filter(|l| &l.issue_id == issue)
            .collect();
        logs.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        logs
    }

    /// Ids of a user's running timers
    pub fn open_logs_for_user(&self, user: &UserId) -> Vec<TimeLogId> {
        self.time_logs
            .values()
            .filter(|l| &l.user_id == user && l.is_open())
            .map(|l| l.id.clone())
            .collect()
    }

    /// Sum of recorded durations over an issue's closed logs.
    ///
    /// This is a recomputation from scratch; the incremental counter on
    /// [`Issue::time_spent`] must always equal it.
    pub fn sum_closed_durations(&self, issue: &IssueId) -> u64 {
        self.time_logs
            .values()
            .filter(|l| &l.issue_id == issue && !l.is_open())
            .map(|l| l.duration_seconds)
            .sum()
    }

    /// Issues whose `time_spent` disagrees with their closed logs, as
    /// `(issue, counter, recomputed)` triples.
    pub fn time_drift(&self) -> Vec<(IssueId, u64, u64)> {
        self.issues
            .values()
            .filter_map(|issue| {
                let recomputed = self.sum_closed_durations(&issue.id);
                (recomputed != issue.time_spent).then(|| (issue.id.clone(), issue.time_spent, recomputed))
            })
            .collect()
    }
}
