//! Record-level operations for entities outside the ordering core.
//!
//! Projects, boards, plain issue fields, comments and releases carry no
//! cross-entity invariants beyond referential checks, so they are managed
//! directly on the store.

use super::EntityStore;
use crate::domain::{
    Board, BoardId, Column, Comment, EntityKind, Issue, IssueId, IssueUpdate, NewIssue, Project,
    ProjectId, Release, ReleaseId, SprintAction, UserId, validate_title,
};
use crate::error::{Error, Result};
use crate::sprint::SprintLifecycle;
use crate::id_generation::IdKind;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

impl EntityStore {
    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a blank name, or an id generation error.
    pub fn create_project(&mut self, name: &str, key: &str, now: DateTime<Utc>) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Project name cannot be empty".to_string()));
        }

        let id = ProjectId::new(self.generate_id(IdKind::Project.prefix(), &[name, key], now)?);
        let project = Project {
            id: id.clone(),
            name: name.to_string(),
            key: key.to_string(),
            created_at: now,
        };
        self.projects.insert(id, project.clone());
        Ok(project)
    }

    /// Create the board of a project, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown project and `Error::Validation`
    /// for an empty or duplicated column list, or one that drops a column
    /// the project's issues still sit in.
    pub fn create_board(
        &mut self,
        project: &ProjectId,
        name: &str,
        columns: Vec<Column>,
        now: DateTime<Utc>,
    ) -> Result<Board> {
        self.require_project(project)?;
        if columns.is_empty() {
            return Err(Error::Validation("A board needs at least one column".to_string()));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.id == column.id) {
                return Err(Error::Validation(format!("Duplicate column '{}'", column.id)));
            }
        }
        if let Some(orphan) = self
            .issues
            .values()
            .find(|i| &i.project_id == project && !columns.iter().any(|c| c.id == i.status_id))
        {
            return Err(Error::Validation(format!(
                "Issue {} is in column '{}', which the new board lacks",
                orphan.id, orphan.status_id
            )));
        }

        let id = BoardId::new(self.generate_id(IdKind::Board.prefix(), &[project.as_str(), name], now)?);
        self.boards.retain(|_, b| &b.project_id != project);
        let board = Board {
            id: id.clone(),
            project_id: project.clone(),
            name: name.to_string(),
            columns,
        };
        self.boards.insert(id, board.clone());
        Ok(board)
    }

    /// Create an issue at the end of its column and of its planning
    /// container.
    ///
    /// The status defaults to the first board column and the planning
    /// container to the backlog.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a bad title or a sprint of another
    /// project, `Error::InvalidTransition` for a completed sprint, and
    /// `Error::NotFound` for an unknown project, sprint or column.
    pub fn create_issue(
        &mut self,
        new_issue: NewIssue,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Issue> {
        new_issue.validate().map_err(Error::Validation)?;
        let project = new_issue.project_id;
        self.require_project(&project)?;

        if let Some(sprint_id) = &new_issue.sprint_id {
            let sprint = self.require_sprint(sprint_id)?;
            if sprint.project_id != project {
                return Err(Error::Validation(format!(
                    "Sprint {sprint_id} belongs to another project"
                )));
            }
            SprintLifecycle::check_transition(sprint, SprintAction::Plan)?;
        }

        let status = match new_issue.status_id {
            Some(status) => {
                self.validate_status(&project, &status)?;
                status
            }
            None => self.initial_status(&project),
        };

        let column_order = self.next_column_order(&project, &status);
        let plan_order = self.next_plan_order(&project, new_issue.sprint_id.as_ref());
        let reporter = new_issue.reporter_id.as_ref().map_or("", UserId::as_str);
        let id = IssueId::new(self.generate_id(prefix, &[&new_issue.title, reporter], now)?);

        let issue = Issue {
            id: id.clone(),
            project_id: project,
            title: new_issue.title,
            description: new_issue.description,
            status_id: status,
            sprint_id: new_issue.sprint_id,
            release_id: None,
            column_order,
            plan_order,
            priority: new_issue.priority,
            issue_type: new_issue.issue_type,
            assignee_ids: new_issue.assignee_ids,
            reporter_id: new_issue.reporter_id,
            time_spent: 0,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        };

        debug!(issue = %id, "Created issue");
        self.issues.insert(id, issue.clone());
        Ok(issue)
    }

    /// Apply a field update to an issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown issue or release and
    /// `Error::Validation` for a bad title.
    pub fn update_issue(
        &mut self,
        id: &IssueId,
        updates: IssueUpdate,
        now: DateTime<Utc>,
    ) -> Result<Issue> {
        if let Some(title) = &updates.title {
            validate_title(title).map_err(Error::Validation)?;
        }
        if let Some(Some(release)) = &updates.release_id
            && !self.releases.contains_key(release)
        {
            return Err(Error::not_found(EntityKind::Release, release));
        }

        let issue = self.require_issue_mut(id)?;

        if let Some(title) = updates.title {
            issue.title = title;
        }
        if let Some(description) = updates.description {
            issue.description = description;
        }
        if let Some(priority) = updates.priority {
            issue.priority = priority;
        }
        if let Some(issue_type) = updates.issue_type {
            issue.issue_type = issue_type;
        }
        if let Some(assignees) = updates.assignee_ids {
            issue.assignee_ids = assignees;
        }
        if let Some(release) = updates.release_id {
            issue.release_id = release;
        }
        issue.updated_at = now;

        Ok(issue.clone())
    }

    /// Delete an issue together with its time logs.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown issue.
    pub fn delete_issue(&mut self, id: &IssueId) -> Result<Issue> {
        let issue = self
            .issues
            .remove(id)
            .ok_or_else(|| Error::not_found(EntityKind::Issue, id))?;

        let before = self.time_logs.len();
        self.time_logs.retain(|_, log| &log.issue_id != id);
        debug!(
            issue = %id,
            logs_removed = before - self.time_logs.len(),
            "Deleted issue"
        );

        Ok(issue)
    }

    /// Append a comment to an issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown issue and `Error::Validation`
    /// for a blank body.
    pub fn add_comment(
        &mut self,
        id: &IssueId,
        author: UserId,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Issue> {
        if body.trim().is_empty() {
            return Err(Error::Validation("Comment cannot be empty".to_string()));
        }

        let issue = self.require_issue_mut(id)?;
        issue.comments.push(Comment {
            author_id: author,
            body: body.to_string(),
            created_at: now,
        });
        issue.updated_at = now;
        Ok(issue.clone())
    }

    /// Create an unreleased release in a project.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown project and `Error::Validation`
    /// for a blank name.
    pub fn create_release(
        &mut self,
        project: &ProjectId,
        name: &str,
        description: &str,
        release_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Release> {
        self.require_project(project)?;
        if name.trim().is_empty() {
            return Err(Error::Validation("Release name cannot be empty".to_string()));
        }

        let id = ReleaseId::new(self.generate_id(IdKind::Release.prefix(), &[project.as_str(), name], now)?);
        let release = Release {
            id: id.clone(),
            project_id: project.clone(),
            name: name.to_string(),
            description: description.to_string(),
            release_date,
            released: false,
        };
        self.releases.insert(id, release.clone());
        Ok(release)
    }

    /// Mark a release as shipped. The release date defaults to today.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown release.
    pub fn mark_released(&mut self, id: &ReleaseId, now: DateTime<Utc>) -> Result<Release> {
        let release = self
            .releases
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Release, id))?;
        release.released = true;
        if release.release_date.is_none() {
            release.release_date = Some(now.date_naive());
        }
        Ok(release.clone())
    }

    /// Delete a release and detach its issues.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown release.
    pub fn delete_release(&mut self, id: &ReleaseId) -> Result<Release> {
        let release = self
            .releases
            .remove(id)
            .ok_or_else(|| Error::not_found(EntityKind::Release, id))?;

        for issue in self.issues.values_mut() {
            if issue.release_id.as_ref() == Some(id) {
                issue.release_id = None;
            }
        }
        Ok(release)
    }
}
