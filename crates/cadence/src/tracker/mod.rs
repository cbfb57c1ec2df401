//! The command facade over the state engine.
//!
//! A [`Tracker`] owns the [`AppState`], a [`BlobStore`] to persist it to and
//! the [`Clock`] every timestamp comes from. Each mutating method applies one
//! operation to the in-memory state and then writes the full state back.
//!
//! # Persistence semantics
//!
//! - A failed operation leaves the state untouched and writes nothing.
//! - A failed write is logged and returned, but the in-memory change stays
//!   applied. The next successful write persists it.
//!
//! Methods take `&mut self`, so commands on one tracker never interleave.

mod command;

pub use command::{Command, Outcome};

use crate::clock::Clock;
use crate::domain::{
    EntityKind, Issue, IssueId, IssueUpdate, NewIssue, ProjectId, Release, ReleaseId, Sprint,
    SprintEdit, SprintId, Theme, TimeLog, TimeLogId, UserId,
};
use crate::error::{Error, Result};
use crate::ordering::{Anchor, Destination, OrderingEngine};
use crate::persistence::{load_state, save_state};
use crate::sprint::{CompletionReport, SprintLifecycle};
use crate::store::{AppState, EntityStore};
use crate::time_accounting::{TimeAccounting, TimerStart};
use cadence_blob::BlobStore;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs commands against the state and persists after each one.
pub struct Tracker {
    state: AppState,
    blobs: Box<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    user: UserId,
    prefix: String,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("user", &self.user)
            .field("prefix", &self.prefix)
            .field("clock", &self.clock)
            .field("blobs", &"<dyn BlobStore>")
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Create a tracker over an already loaded state
    pub fn new(
        state: AppState,
        blobs: Box<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        user: UserId,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            state,
            blobs,
            clock,
            user,
            prefix: prefix.into(),
        }
    }

    /// Load the state from `blobs` and create a tracker over it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted state cannot be read.
    pub async fn open(
        blobs: Box<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        user: UserId,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let state = load_state(blobs.as_ref()).await?;
        Ok(Self::new(state, blobs, clock, user, prefix))
    }

    /// The full application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The entity store
    pub fn store(&self) -> &EntityStore {
        &self.state.store
    }

    /// The acting user
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The issue id prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The selected project, falling back to the first project.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the state has no project.
    pub fn current_project(&self) -> Result<ProjectId> {
        self.state
            .current_project_id
            .clone()
            .or_else(|| self.state.store.projects().next().map(|p| p.id.clone()))
            .ok_or_else(|| Error::not_found(EntityKind::Project, "(none)"))
    }

    /// Write the full state to the blob store.
    ///
    /// # Errors
    ///
    /// Returns the storage error after logging it.
    pub async fn persist(&self) -> Result<()> {
        if let Err(e) = save_state(self.blobs.as_ref(), &self.state).await {
            error!(error = %e, "Failed to persist state; in-memory changes are kept");
            return Err(e);
        }
        Ok(())
    }

    /// Apply a command and persist.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or the storage error if the write
    /// failed after a successful operation.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = command.name(), "Executing command");

        match command {
            Command::Reorder {
                issue_id,
                destination,
                anchor,
            } => self
                .reorder(&issue_id, &destination, &anchor)
                .await
                .map(Outcome::Reordered),
            Command::CreateSprint { project_id, name } => {
                let project = self.project_or_current(project_id)?;
                self.create_sprint(&project, name.as_deref())
                    .await
                    .map(Outcome::Sprint)
            }
            Command::StartSprint {
                sprint_id,
                start_date,
                end_date,
                goal,
            } => self
                .start_sprint(&sprint_id, start_date, end_date, &goal)
                .await
                .map(Outcome::Sprint),
            Command::EditSprint {
                sprint_id,
                name,
                start_date,
                end_date,
                goal,
            } => {
                let edit = SprintEdit {
                    name,
                    start_date,
                    end_date,
                    goal,
                };
                self.edit_sprint(&sprint_id, edit).await.map(Outcome::Sprint)
            }
            Command::CompleteSprint { sprint_id } => self
                .complete_sprint(&sprint_id)
                .await
                .map(Outcome::SprintCompleted),
            Command::DeleteSprint { sprint_id } => self
                .delete_sprint(&sprint_id)
                .await
                .map(Outcome::SprintDeleted),
            Command::StartTimeLog { issue_id } => self
                .start_timer(&issue_id)
                .await
                .map(Outcome::TimerStarted),
            Command::StopTimeLog { log_id } => {
                self.stop_timer(&log_id).await.map(Outcome::TimeLog)
            }
            Command::LogManualTime {
                issue_id,
                seconds,
                date,
            } => self
                .log_manual_time(&issue_id, seconds, date)
                .await
                .map(Outcome::TimeLog),
            Command::EditTimeLog {
                log_id,
                seconds,
                date,
            } => self
                .edit_time_log(&log_id, seconds, date)
                .await
                .map(Outcome::TimeLog),
            Command::DeleteTimeLog { log_id } => {
                self.delete_time_log(&log_id).await.map(Outcome::TimeLog)
            }
            Command::CreateIssue { issue } => self
                .create_issue(issue)
                .await
                .map(|i| Outcome::Issue(Box::new(i))),
            Command::UpdateIssue { issue_id, updates } => self
                .update_issue(&issue_id, updates)
                .await
                .map(|i| Outcome::Issue(Box::new(i))),
            Command::DeleteIssue { issue_id } => self
                .delete_issue(&issue_id)
                .await
                .map(|i| Outcome::Issue(Box::new(i))),
            Command::AddComment { issue_id, body } => self
                .add_comment(&issue_id, &body)
                .await
                .map(|i| Outcome::Issue(Box::new(i))),
            Command::CreateRelease {
                project_id,
                name,
                description,
                release_date,
            } => {
                let project = self.project_or_current(project_id)?;
                self.create_release(&project, &name, &description, release_date)
                    .await
                    .map(Outcome::Release)
            }
            Command::ReleaseVersion { release_id } => self
                .release_version(&release_id)
                .await
                .map(Outcome::Release),
            Command::DeleteRelease { release_id } => self
                .delete_release(&release_id)
                .await
                .map(Outcome::Release),
            Command::SetTheme { theme } => self.set_theme(theme).await.map(Outcome::Theme),
            Command::Restore { backup } => {
                self.restore(&backup).await?;
                Ok(Outcome::Restored {
                    issues: self.state.store.issues().count(),
                    sprints: self.state.store.sprints().count(),
                })
            }
        }
    }

    // ========== Ordering ==========

    /// Move an issue and persist. See [`OrderingEngine::reorder`].
    ///
    /// # Errors
    ///
    /// Returns the ordering error or a storage error.
    pub async fn reorder(
        &mut self,
        issue_id: &IssueId,
        destination: &Destination,
        anchor: &Anchor,
    ) -> Result<Vec<IssueId>> {
        let order = OrderingEngine::new(&mut self.state.store, self.clock.as_ref())
            .reorder(issue_id, destination, anchor)?;
        self.persist().await?;
        Ok(order)
    }

    // ========== Sprints ==========

    /// Create a sprint and persist. See [`SprintLifecycle::create`].
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error or a storage error.
    pub async fn create_sprint(&mut self, project: &ProjectId, name: Option<&str>) -> Result<Sprint> {
        let sprint = self.sprints().create(project, name)?;
        self.persist().await?;
        Ok(sprint)
    }

    /// Start a sprint and persist. See [`SprintLifecycle::start`].
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error or a storage error.
    pub async fn start_sprint(
        &mut self,
        id: &SprintId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        goal: &str,
    ) -> Result<Sprint> {
        let sprint = self.sprints().start(id, start_date, end_date, goal)?;
        self.persist().await?;
        Ok(sprint)
    }

    /// Edit a sprint and persist. See [`SprintLifecycle::edit`].
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error or a storage error.
    pub async fn edit_sprint(&mut self, id: &SprintId, edit: SprintEdit) -> Result<Sprint> {
        let sprint = self.sprints().edit(id, edit)?;
        self.persist().await?;
        Ok(sprint)
    }

    /// Complete a sprint and persist. See [`SprintLifecycle::complete`].
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error or a storage error.
    pub async fn complete_sprint(&mut self, id: &SprintId) -> Result<CompletionReport> {
        let report = self.sprints().complete(id)?;
        self.persist().await?;
        Ok(report)
    }

    /// Delete a sprint and persist. See [`SprintLifecycle::delete`].
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error or a storage error.
    pub async fn delete_sprint(&mut self, id: &SprintId) -> Result<Vec<IssueId>> {
        let returned = self.sprints().delete(id)?;
        self.persist().await?;
        Ok(returned)
    }

    // ========== Time accounting ==========

    /// Start a timer for the acting user and persist.
    ///
    /// # Errors
    ///
    /// Returns the accounting error or a storage error.
    pub async fn start_timer(&mut self, issue: &IssueId) -> Result<TimerStart> {
        let user = self.user.clone();
        let started = self.time().start_timer(issue, &user)?;
        self.persist().await?;
        Ok(started)
    }

    /// Stop a timer and persist.
    ///
    /// # Errors
    ///
    /// Returns the accounting error or a storage error.
    pub async fn stop_timer(&mut self, log: &TimeLogId) -> Result<TimeLog> {
        let stopped = self.time().stop_timer(log)?;
        self.persist().await?;
        Ok(stopped)
    }

    /// Log manual time for the acting user on `date` and persist.
    ///
    /// # Errors
    ///
    /// Returns the accounting error or a storage error.
    pub async fn log_manual_time(
        &mut self,
        issue: &IssueId,
        seconds: u64,
        date: NaiveDate,
    ) -> Result<TimeLog> {
        let user = self.user.clone();
        let log = self
            .time()
            .log_manual(issue, &user, seconds, start_of_day(date))?;
        self.persist().await?;
        Ok(log)
    }

    /// Edit a time log and persist.
    ///
    /// # Errors
    ///
    /// Returns the accounting error or a storage error.
    pub async fn edit_time_log(
        &mut self,
        log: &TimeLogId,
        seconds: u64,
        date: NaiveDate,
    ) -> Result<TimeLog> {
        let edited = self.time().edit_log(log, seconds, start_of_day(date))?;
        self.persist().await?;
        Ok(edited)
    }

    /// Delete a time log and persist.
    ///
    /// # Errors
    ///
    /// Returns the accounting error or a storage error.
    pub async fn delete_time_log(&mut self, log: &TimeLogId) -> Result<TimeLog> {
        let deleted = self.time().delete_log(log)?;
        self.persist().await?;
        Ok(deleted)
    }

    /// Issues whose `time_spent` disagrees with their closed logs
    pub fn audit(&self) -> Vec<(IssueId, u64, u64)> {
        self.state.store.time_drift()
    }

    // ========== Issues and releases ==========

    /// Create an issue and persist.
    ///
    /// # Errors
    ///
    /// Returns a validation, lookup or storage error.
    pub async fn create_issue(&mut self, new_issue: NewIssue) -> Result<Issue> {
        let now = self.clock.now();
        let issue = self.state.store.create_issue(new_issue, &self.prefix, now)?;
        self.persist().await?;
        Ok(issue)
    }

    /// Update an issue and persist.
    ///
    /// # Errors
    ///
    /// Returns a validation, lookup or storage error.
    pub async fn update_issue(&mut self, id: &IssueId, updates: IssueUpdate) -> Result<Issue> {
        let now = self.clock.now();
        let issue = self.state.store.update_issue(id, updates, now)?;
        self.persist().await?;
        Ok(issue)
    }

    /// Delete an issue with its time logs and persist.
    ///
    /// # Errors
    ///
    /// Returns a lookup or storage error.
    pub async fn delete_issue(&mut self, id: &IssueId) -> Result<Issue> {
        let issue = self.state.store.delete_issue(id)?;
        self.persist().await?;
        Ok(issue)
    }

    /// Comment on an issue as the acting user and persist.
    ///
    /// # Errors
    ///
    /// Returns a validation, lookup or storage error.
    pub async fn add_comment(&mut self, id: &IssueId, body: &str) -> Result<Issue> {
        let now = self.clock.now();
        let issue = self
            .state
            .store
            .add_comment(id, self.user.clone(), body, now)?;
        self.persist().await?;
        Ok(issue)
    }

    /// Create a release and persist.
    ///
    /// # Errors
    ///
    /// Returns a validation, lookup or storage error.
    pub async fn create_release(
        &mut self,
        project: &ProjectId,
        name: &str,
        description: &str,
        release_date: Option<NaiveDate>,
    ) -> Result<Release> {
        let now = self.clock.now();
        let release = self
            .state
            .store
            .create_release(project, name, description, release_date, now)?;
        self.persist().await?;
        Ok(release)
    }

    /// Mark a release as shipped and persist.
    ///
    /// # Errors
    ///
    /// Returns a lookup or storage error.
    pub async fn release_version(&mut self, id: &ReleaseId) -> Result<Release> {
        let now = self.clock.now();
        let release = self.state.store.mark_released(id, now)?;
        self.persist().await?;
        Ok(release)
    }

    /// Delete a release and persist.
    ///
    /// # Errors
    ///
    /// Returns a lookup or storage error.
    pub async fn delete_release(&mut self, id: &ReleaseId) -> Result<Release> {
        let release = self.state.store.delete_release(id)?;
        self.persist().await?;
        Ok(release)
    }

    /// Switch the theme and persist.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        self.state.theme = theme;
        self.persist().await?;
        Ok(theme)
    }

    // ========== Backup ==========

    /// The full state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error.
    pub fn export_backup(&self) -> Result<String> {
        let bytes = self.state.to_json(true)?;
        String::from_utf8(bytes).map_err(|e| Error::Validation(e.to_string()))
    }

    /// Replace the whole state with a backup and persist.
    ///
    /// The current state is kept when the backup is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBackup` for malformed payloads, or a storage
    /// error.
    pub async fn restore(&mut self, json: &str) -> Result<()> {
        let state = AppState::from_backup(json)?;
        info!(
            issues = state.store.issues().count(),
            sprints = state.store.sprints().count(),
            logs = state.store.time_logs().count(),
            "Restoring backup"
        );
        self.state = state;
        self.persist().await
    }

    // ========== Helpers ==========

    fn sprints(&mut self) -> SprintLifecycle<'_> {
        SprintLifecycle::new(&mut self.state.store, self.clock.as_ref())
    }

    fn time(&mut self) -> TimeAccounting<'_> {
        TimeAccounting::new(&mut self.state.store, self.clock.as_ref())
    }

    fn project_or_current(&self, project: Option<ProjectId>) -> Result<ProjectId> {
        match project {
            Some(project) => Ok(project),
            None => self.current_project(),
        }
    }
}

/// Midnight UTC at the start of `date`
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}
