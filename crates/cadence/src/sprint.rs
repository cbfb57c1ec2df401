//! Sprint lifecycle state machine.
//!
//! ```text
//! Planned --start--> Active --complete--> Completed
//! ```
//!
//! `edit` is legal before completion and `delete` from any state. Issue
//! membership only changes on `complete`, which returns unfinished work to
//! the backlog, and on `delete`, which returns everything.

use crate::clock::Clock;
use crate::domain::{IssueId, ProjectId, Sprint, SprintAction, SprintEdit, SprintId, SprintStatus};
use crate::error::{Error, Result};
use crate::id_generation::IdKind;
use crate::ordering::OrderingEngine;
use crate::store::EntityStore;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What `complete` did with the sprint's issues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    /// Finished issues that stay tagged to the sprint
    pub completed: Vec<IssueId>,
    /// Unfinished issues moved to the end of the backlog
    pub returned_to_backlog: Vec<IssueId>,
}

/// Applies sprint transitions to an [`EntityStore`].
pub struct SprintLifecycle<'a> {
    store: &'a mut EntityStore,
    clock: &'a dyn Clock,
}

impl<'a> SprintLifecycle<'a> {
    /// Create a lifecycle over a store
    pub fn new(store: &'a mut EntityStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Create a planned sprint with no dates.
    ///
    /// Without a name the sprint is called `Sprint N`, N being one more than
    /// the number of sprints the project already has.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown project.
    pub fn create(&mut self, project: &ProjectId, name: Option<&str>) -> Result<Sprint> {
        self.store.require_project(project)?;

        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let count = self
                    .store
                    .sprints()
                    .filter(|s| &s.project_id == project)
                    .count();
                format!("Sprint {}", count + 1)
            }
        };

        let now = self.clock.now();
        let id = SprintId::new(self.store.generate_id(
            IdKind::Sprint.prefix(),
            &[project.as_str(), &name],
            now,
        )?);

        let sprint = Sprint {
            id,
            project_id: project.clone(),
            name,
            goal: String::new(),
            start_date: None,
            end_date: None,
            status: SprintStatus::Planned,
            completed_at: None,
        };
        self.store.insert_sprint(sprint.clone());

        info!(sprint = %sprint.id, name = %sprint.name, "Created sprint");
        Ok(sprint)
    }

    /// Start a planned sprint.
    ///
    /// Issue membership is unchanged: issues are planned into a sprint with
    /// [`OrderingEngine::reorder`] before it starts.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown sprint and
    /// `Error::InvalidTransition` unless the sprint is planned.
    pub fn start(
        &mut self,
        id: &SprintId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        goal: &str,
    ) -> Result<Sprint> {
        let sprint = self.store.require_sprint(id)?;
        Self::check_transition(sprint, SprintAction::Start)?;
        let project = sprint.project_id.clone();

        let already_active: Vec<SprintId> = self
            .store
            .active_sprints(&project)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        if !already_active.is_empty() {
            warn!(
                sprint = %id,
                project = %project,
                ?already_active,
                "Starting a second active sprint in project"
            );
        }

        let sprint = self.store.require_sprint_mut(id)?;
        sprint.start_date = Some(start_date);
        sprint.end_date = Some(end_date);
        sprint.goal = goal.to_string();
        sprint.status = SprintStatus::Active;

        info!(sprint = %id, %start_date, %end_date, "Started sprint");
        Ok(sprint.clone())
    }

    /// Rewrite a sprint's name, dates and goal.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown sprint,
    /// `Error::InvalidTransition` for a completed one and `Error::Validation`
    /// for a blank name.
    pub fn edit(&mut self, id: &SprintId, edit: SprintEdit) -> Result<Sprint> {
        let sprint = self.store.require_sprint_mut(id)?;
        Self::check_transition(sprint, SprintAction::Edit)?;
        if edit.name.trim().is_empty() {
            return Err(Error::Validation("Sprint name cannot be empty".to_string()));
        }

        sprint.name = edit.name;
        sprint.start_date = edit.start_date;
        sprint.end_date = edit.end_date;
        sprint.goal = edit.goal;
        Ok(sprint.clone())
    }

    /// Complete an active sprint.
    ///
    /// Issues in a done column stay tagged to the sprint as its record of
    /// finished work. All other members move to the end of the backlog,
    /// keeping their sprint order.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown sprint and
    /// `Error::InvalidTransition` unless the sprint is active.
    pub fn complete(&mut self, id: &SprintId) -> Result<CompletionReport> {
        let sprint = self.store.require_sprint(id)?;
        Self::check_transition(sprint, SprintAction::Complete)?;

        let (completed, unfinished): (Vec<IssueId>, Vec<IssueId>) = self
            .store
            .sprint_members(id)
            .into_iter()
            .partition(|issue_id| {
                self.store
                    .issue(issue_id)
                    .is_some_and(|i| self.store.is_done_status(&i.project_id, &i.status_id))
            });

        let now = self.clock.now();
        let sprint = self.store.require_sprint_mut(id)?;
        sprint.status = SprintStatus::Completed;
        sprint.completed_at = Some(now);

        let returned_to_backlog = self.return_to_backlog(&unfinished);

        info!(
            sprint = %id,
            completed = completed.len(),
            returned = returned_to_backlog.len(),
            "Completed sprint"
        );
        Ok(CompletionReport {
            completed,
            returned_to_backlog,
        })
    }

    /// Delete a sprint in any state, returning all of its issues to the end
    /// of the backlog.
    ///
    /// Returns the issues that were moved.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown sprint.
    pub fn delete(&mut self, id: &SprintId) -> Result<Vec<IssueId>> {
        self.store.require_sprint(id)?;
        let members = self.store.sprint_members(id);

        let returned = self.return_to_backlog(&members);
        self.store.remove_sprint(id);

        info!(sprint = %id, returned = returned.len(), "Deleted sprint");
        Ok(returned)
    }

    /// Active sprints of a project
    pub fn active_sprints(&self, project: &ProjectId) -> Vec<SprintId> {
        self.store
            .active_sprints(project)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    /// Append issues to the end of their own project's backlog, keeping
    /// their relative order.
    fn return_to_backlog(&mut self, ids: &[IssueId]) -> Vec<IssueId> {
        let mut by_project: BTreeMap<ProjectId, Vec<IssueId>> = BTreeMap::new();
        for id in ids {
            if let Some(issue) = self.store.issue(id) {
                by_project
                    .entry(issue.project_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }

        let mut engine = OrderingEngine::new(self.store, self.clock);
        let moved: HashSet<IssueId> = by_project
            .iter()
            .flat_map(|(project, group)| engine.append_to_plan(project, None, group))
            .collect();
        ids.iter().filter(|id| moved.contains(*id)).cloned().collect()
    }

    /// Check that `action` is legal in the sprint's current state.
    pub(crate) fn check_transition(sprint: &Sprint, action: SprintAction) -> Result<()> {
        let allowed = match action {
            SprintAction::Start => sprint.status == SprintStatus::Planned,
            SprintAction::Edit | SprintAction::Plan => sprint.status != SprintStatus::Completed,
            SprintAction::Complete => sprint.status == SprintStatus::Active,
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                sprint_id: sprint.id.clone(),
                from: sprint.status,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{EntityKind, NewIssue, StatusId, default_columns};
    use crate::ordering::{Anchor, Destination};
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        store: EntityStore,
        clock: ManualClock,
        project: ProjectId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = EntityStore::new();
            let project = store.create_project("Demo", "DEMO", t0()).unwrap().id;
            store
                .create_board(&project, "Board", default_columns(), t0())
                .unwrap();
            Self {
                store,
                clock: ManualClock::new(t0()),
                project,
            }
        }

        fn lifecycle(&mut self) -> SprintLifecycle<'_> {
            SprintLifecycle::new(&mut self.store, &self.clock)
        }

        fn planned_issue(&mut self, title: &str, sprint: &SprintId) -> IssueId {
            let input = NewIssue {
                project_id: self.project.clone(),
                title: title.to_string(),
                ..Default::default()
            };
            let id = self.store.create_issue(input, "demo", t0()).unwrap().id;
            OrderingEngine::new(&mut self.store, &self.clock)
                .reorder(&id, &Destination::Sprint(sprint.clone()), &Anchor::End)
                .unwrap();
            id
        }

        fn mark_done(&mut self, id: &IssueId) {
            OrderingEngine::new(&mut self.store, &self.clock)
                .reorder(id, &Destination::Column(StatusId::new("done")), &Anchor::End)
                .unwrap();
        }

        fn active_sprint(&mut self) -> SprintId {
            let project = self.project.clone();
            let id = self.lifecycle().create(&project, None).unwrap().id;
            self.lifecycle()
                .start(&id, date("2024-01-01"), date("2024-01-15"), "Ship it")
                .unwrap();
            id
        }
    }

    #[test]
    fn test_create_uses_sequential_default_names() {
        let mut fx = Fixture::new();
        let project = fx.project.clone();

        let first = fx.lifecycle().create(&project, None).unwrap();
        let second = fx.lifecycle().create(&project, Some("  ")).unwrap();
        let named = fx.lifecycle().create(&project, Some("Hardening")).unwrap();

        assert_eq!(first.name, "Sprint 1");
        assert_eq!(second.name, "Sprint 2");
        assert_eq!(named.name, "Hardening");
        assert_eq!(first.status, SprintStatus::Planned);
        assert!(first.start_date.is_none());
        assert!(first.id.as_str().starts_with("sprint-"));
    }

    #[test]
    fn test_start_assigns_dates_and_goal() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();

        let sprint = fx.store.sprint(&id).unwrap();
        assert_eq!(sprint.status, SprintStatus::Active);
        assert_eq!(sprint.start_date, Some(date("2024-01-01")));
        assert_eq!(sprint.end_date, Some(date("2024-01-15")));
        assert_eq!(sprint.goal, "Ship it");
    }

    #[rstest]
    #[case::start_active(SprintStatus::Active, SprintAction::Start)]
    #[case::start_completed(SprintStatus::Completed, SprintAction::Start)]
    #[case::complete_planned(SprintStatus::Planned, SprintAction::Complete)]
    #[case::complete_completed(SprintStatus::Completed, SprintAction::Complete)]
    #[case::edit_completed(SprintStatus::Completed, SprintAction::Edit)]
    #[case::plan_completed(SprintStatus::Completed, SprintAction::Plan)]
    fn test_illegal_transitions_are_rejected(
        #[case] status: SprintStatus,
        #[case] action: SprintAction,
    ) {
        let mut fx = Fixture::new();
        let project = fx.project.clone();
        let id = fx.lifecycle().create(&project, None).unwrap().id;
        fx.store.sprint_mut(&id).unwrap().status = status;

        let result = match action {
            SprintAction::Start => fx
                .lifecycle()
                .start(&id, date("2024-01-01"), date("2024-01-15"), "")
                .map(|_| ()),
            SprintAction::Edit => fx
                .lifecycle()
                .edit(
                    &id,
                    SprintEdit {
                        name: "Renamed".to_string(),
                        ..Default::default()
                    },
                )
                .map(|_| ()),
            SprintAction::Complete => fx.lifecycle().complete(&id).map(|_| ()),
            SprintAction::Plan => {
                let input = NewIssue {
                    project_id: project.clone(),
                    title: "Late".to_string(),
                    ..Default::default()
                };
                let issue = fx.store.create_issue(input, "demo", t0()).unwrap().id;
                OrderingEngine::new(&mut fx.store, &fx.clock)
                    .reorder(&issue, &Destination::Sprint(id.clone()), &Anchor::End)
                    .map(|_| ())
            }
        };

        assert!(matches!(
            result,
            Err(Error::InvalidTransition { from, action: a, .. }) if from == status && a == action
        ));
        assert_eq!(fx.store.sprint(&id).unwrap().status, status);
    }

    #[test]
    fn test_unknown_sprint_is_not_found() {
        let mut fx = Fixture::new();
        let missing = SprintId::new("sprint-none");

        assert!(matches!(
            fx.lifecycle().complete(&missing),
            Err(Error::NotFound {
                kind: EntityKind::Sprint,
                ..
            })
        ));
        assert!(fx.lifecycle().delete(&missing).is_err());
    }

    #[test]
    fn test_edit_active_sprint_rewrites_fields() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();

        let edited = fx
            .lifecycle()
            .edit(
                &id,
                SprintEdit {
                    name: "Renamed".to_string(),
                    start_date: Some(date("2024-01-02")),
                    end_date: None,
                    goal: "New goal".to_string(),
                },
            )
            .unwrap();

        assert_eq!(edited.name, "Renamed");
        assert_eq!(edited.end_date, None);
        assert_eq!(edited.status, SprintStatus::Active);
    }

    #[test]
    fn test_complete_keeps_done_work_and_evicts_the_rest() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();
        let a = fx.planned_issue("A", &id);
        let b = fx.planned_issue("B", &id);
        let c = fx.planned_issue("C", &id);
        fx.mark_done(&a);
        fx.clock.advance(chrono::Duration::days(14));

        let report = fx.lifecycle().complete(&id).unwrap();

        assert_eq!(report.completed, vec![a.clone()]);
        assert_eq!(report.returned_to_backlog, vec![b.clone(), c.clone()]);
        assert_eq!(fx.store.issue(&a).unwrap().sprint_id, Some(id.clone()));
        assert!(fx.store.issue(&b).unwrap().sprint_id.is_none());

        let sprint = fx.store.sprint(&id).unwrap();
        assert_eq!(sprint.status, SprintStatus::Completed);
        assert_eq!(sprint.completed_at, Some(t0() + chrono::Duration::days(14)));
    }

    #[test]
    fn test_evicted_issues_join_end_of_backlog() {
        let mut fx = Fixture::new();
        let input = NewIssue {
            project_id: fx.project.clone(),
            title: "Waiting".to_string(),
            ..Default::default()
        };
        let waiting = fx.store.create_issue(input, "demo", t0()).unwrap().id;
        let id = fx.active_sprint();
        let b = fx.planned_issue("B", &id);
        let c = fx.planned_issue("C", &id);

        fx.lifecycle().complete(&id).unwrap();

        let backlog = fx.store.plan_members(&fx.project, None);
        assert_eq!(backlog, vec![waiting, b, c]);
        let orders: Vec<u32> = backlog
            .iter()
            .map(|i| fx.store.issue(i).unwrap().plan_order)
            .collect();
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_delete_returns_every_member() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();
        let a = fx.planned_issue("A", &id);
        let b = fx.planned_issue("B", &id);
        fx.mark_done(&a);

        let returned = fx.lifecycle().delete(&id).unwrap();

        assert_eq!(returned, vec![a.clone(), b]);
        assert!(fx.store.sprint(&id).is_none());
        assert!(fx.store.issue(&a).unwrap().sprint_id.is_none());
    }

    /// Issue of another project tagged to `sprint`, as a restored blob may hold
    fn foreign_member(fx: &mut Fixture, sprint: &SprintId) -> (ProjectId, IssueId) {
        let other = fx.store.create_project("Other", "OTH", t0()).unwrap().id;
        fx.store
            .create_board(&other, "Board", default_columns(), t0())
            .unwrap();
        let input = NewIssue {
            project_id: other.clone(),
            title: "Stray".to_string(),
            ..Default::default()
        };
        let id = fx.store.create_issue(input, "oth", t0()).unwrap().id;
        fx.store.issue_mut(&id).unwrap().sprint_id = Some(sprint.clone());
        (other, id)
    }

    #[test]
    fn test_delete_clears_members_of_other_projects() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();
        let own = fx.planned_issue("Own", &id);
        let (other, stray) = foreign_member(&mut fx, &id);

        let mut returned = fx.lifecycle().delete(&id).unwrap();
        returned.sort();
        let mut expected = vec![own, stray.clone()];
        expected.sort();

        assert_eq!(returned, expected);
        assert!(fx.store.sprint_members(&id).is_empty());
        assert_eq!(fx.store.plan_members(&other, None), vec![stray]);
    }

    #[test]
    fn test_complete_evicts_unfinished_members_of_other_projects() {
        let mut fx = Fixture::new();
        let id = fx.active_sprint();
        let (other, stray) = foreign_member(&mut fx, &id);

        let report = fx.lifecycle().complete(&id).unwrap();

        assert_eq!(report.returned_to_backlog, vec![stray.clone()]);
        assert!(fx.store.issue(&stray).unwrap().sprint_id.is_none());
        assert_eq!(fx.store.plan_members(&other, None), vec![stray]);
    }

    #[test]
    fn test_second_active_sprint_is_permitted() {
        let mut fx = Fixture::new();
        let first = fx.active_sprint();
        let second = fx.active_sprint();

        let project = fx.project.clone();
        let mut active = fx.lifecycle().active_sprints(&project);
        active.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(active, expected);
    }
}
