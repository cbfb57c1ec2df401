//! Container ordering for drag-and-drop moves.
//!
//! Every issue belongs to one status column and to one planning container
//! (a sprint or the backlog). [`OrderingEngine::reorder`] moves an issue into
//! a destination container along exactly one of those dimensions and
//! renumbers the destination's members to a contiguous `0..n` sequence.
//!
//! The source container is not renumbered. The hole it is left with is
//! harmless because order values are only ever consumed by sorting.
//!
//! # Concurrency
//!
//! `reorder` reads the full sibling set and then rewrites it, so it is only
//! correct under serialized access. Callers sharing a store between writers
//! must hold a lock per `(project, container)` around each call.

use crate::clock::Clock;
use crate::domain::{EntityKind, IssueId, ProjectId, SprintAction, SprintId, StatusId};
use crate::error::{Error, Result};
use crate::sprint::SprintLifecycle;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Target container of a move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Destination {
    /// A status column of the issue's project board
    Column(StatusId),
    /// A sprint of the issue's project
    Sprint(SprintId),
    /// The project backlog
    Backlog,
}

impl Destination {
    /// Planning destination for an optional sprint
    pub fn plan(sprint: Option<SprintId>) -> Self {
        sprint.map_or(Self::Backlog, Self::Sprint)
    }
}

/// Insertion point within the destination container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Anchor {
    /// Insert immediately before this issue
    Before(IssueId),
    /// Append after the last member
    #[default]
    End,
}

/// Applies moves to the issues of an [`EntityStore`].
pub struct OrderingEngine<'a> {
    store: &'a mut EntityStore,
    clock: &'a dyn Clock,
}

impl<'a> OrderingEngine<'a> {
    /// Create an engine over a store
    pub fn new(store: &'a mut EntityStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Move an issue into `destination`, placing it at `anchor`.
    ///
    /// Returns the destination container's issue ids in their final order.
    ///
    /// An anchor that does not exist, or is not a member of the destination,
    /// degrades to [`Anchor::End`].
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` for an unknown issue or sprint, or a column that is
    ///   not on the project's board
    /// - `Error::Validation` for a sprint of another project
    /// - `Error::InvalidTransition` for a completed sprint
    /// - `Error::SelfAnchor` when the anchor is the moved issue
    ///
    /// The store is untouched when an error is returned.
    pub fn reorder(
        &mut self,
        issue_id: &IssueId,
        destination: &Destination,
        anchor: &Anchor,
    ) -> Result<Vec<IssueId>> {
        let project = self.store.require_issue(issue_id)?.project_id.clone();

        if let Anchor::Before(anchor_id) = anchor
            && anchor_id == issue_id
        {
            return Err(Error::SelfAnchor(issue_id.clone()));
        }

        match destination {
            Destination::Column(status) => self.store.validate_status(&project, status)?,
            Destination::Sprint(sprint_id) => self.check_sprint(&project, sprint_id)?,
            Destination::Backlog => {}
        }

        let siblings: Vec<IssueId> = self
            .members(&project, destination)
            .into_iter()
            .filter(|id| id != issue_id)
            .collect();

        let position = match anchor {
            Anchor::End => siblings.len(),
            Anchor::Before(anchor_id) => {
                if let Some(index) = siblings.iter().position(|id| id == anchor_id) {
                    index
                } else {
                    warn!(
                        issue = %issue_id,
                        anchor = %anchor_id,
                        "Anchor is not in the destination container, appending"
                    );
                    siblings.len()
                }
            }
        };

        let mut sequence = siblings;
        sequence.insert(position, issue_id.clone());

        let now = self.clock.now();
        let moved = self.store.require_issue_mut(issue_id)?;
        match destination {
            Destination::Column(status) => moved.status_id = status.clone(),
            Destination::Sprint(sprint_id) => moved.sprint_id = Some(sprint_id.clone()),
            Destination::Backlog => moved.sprint_id = None,
        }
        moved.updated_at = now;

        self.renumber(&sequence, destination);

        debug!(
            issue = %issue_id,
            ?destination,
            position,
            members = sequence.len(),
            "Reordered issue"
        );
        Ok(sequence)
    }

    /// Move issues into a planning container after its current last member,
    /// keeping the given relative order.
    ///
    /// Issues already in the target are skipped.
    pub fn append_to_plan(
        &mut self,
        project: &ProjectId,
        sprint: Option<&SprintId>,
        ids: &[IssueId],
    ) -> Vec<IssueId> {
        let mut next = self.store.next_plan_order(project, sprint);
        let now = self.clock.now();
        let mut appended = Vec::with_capacity(ids.len());

        for id in ids {
            let Some(issue) = self.store.issue_mut(id) else {
                continue;
            };
            if issue.sprint_id.as_ref() == sprint {
                continue;
            }
            issue.sprint_id = sprint.cloned();
            issue.plan_order = next;
            issue.updated_at = now;
            next = next.saturating_add(1);
            appended.push(id.clone());
        }

        appended
    }

    fn check_sprint(&self, project: &ProjectId, sprint_id: &SprintId) -> Result<()> {
        let sprint = self
            .store
            .sprint(sprint_id)
            .ok_or_else(|| Error::not_found(EntityKind::Sprint, sprint_id))?;
        if &sprint.project_id != project {
            return Err(Error::Validation(format!(
                "Sprint {sprint_id} belongs to another project"
            )));
        }
        SprintLifecycle::check_transition(sprint, SprintAction::Plan)
    }

    fn members(&self, project: &ProjectId, destination: &Destination) -> Vec<IssueId> {
        match destination {
            Destination::Column(status) => self.store.column_members(project, status),
            Destination::Sprint(sprint_id) => self.store.plan_members(project, Some(sprint_id)),
            Destination::Backlog => self.store.plan_members(project, None),
        }
    }

    fn renumber(&mut self, sequence: &[IssueId], destination: &Destination) {
        for (index, id) in (0u32..).zip(sequence) {
            if let Some(issue) = self.store.issue_mut(id) {
                match destination {
                    Destination::Column(_) => issue.column_order = index,
                    Destination::Sprint(_) | Destination::Backlog => issue.plan_order = index,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{NewIssue, Sprint, SprintStatus, default_columns};
    use chrono::{DateTime, Utc};

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    struct Fixture {
        store: EntityStore,
        clock: ManualClock,
        project: ProjectId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = EntityStore::new();
            let project = store.create_project("Demo", "DEMO", start()).unwrap().id;
            store
                .create_board(&project, "Board", default_columns(), start())
                .unwrap();
            Self {
                store,
                clock: ManualClock::new(start()),
                project,
            }
        }

        fn issue(&mut self, title: &str) -> IssueId {
            let input = NewIssue {
                project_id: self.project.clone(),
                title: title.to_string(),
                ..Default::default()
            };
            self.store.create_issue(input, "demo", start()).unwrap().id
        }

        fn sprint(&mut self, id: &str) -> SprintId {
            let id = SprintId::new(id);
            self.store.insert_sprint(Sprint {
                id: id.clone(),
                project_id: self.project.clone(),
                name: "Sprint".to_string(),
                goal: String::new(),
                start_date: None,
                end_date: None,
                status: SprintStatus::Planned,
                completed_at: None,
            });
            id
        }

        fn engine(&mut self) -> OrderingEngine<'_> {
            OrderingEngine::new(&mut self.store, &self.clock)
        }
    }

    #[test]
    fn test_insert_before_anchor_renumbers_destination() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let b = fx.issue("B");
        let c = fx.issue("C");

        let order = fx
            .engine()
            .reorder(&c, &Destination::Backlog, &Anchor::Before(a.clone()))
            .unwrap();

        assert_eq!(order, vec![c.clone(), a.clone(), b.clone()]);
        assert_eq!(fx.store.issue(&c).unwrap().plan_order, 0);
        assert_eq!(fx.store.issue(&a).unwrap().plan_order, 1);
        assert_eq!(fx.store.issue(&b).unwrap().plan_order, 2);
    }

    #[test]
    fn test_column_move_leaves_plan_order_untouched() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let b = fx.issue("B");
        let in_progress = StatusId::new("in_progress");

        fx.engine()
            .reorder(&a, &Destination::Column(in_progress.clone()), &Anchor::End)
            .unwrap();

        let moved = fx.store.issue(&a).unwrap();
        assert_eq!(moved.status_id, in_progress);
        assert_eq!(moved.column_order, 0);
        assert_eq!(moved.plan_order, 0);
        assert_eq!(fx.store.plan_members(&fx.project, None), vec![a, b.clone()]);
        // Source column keeps its hole
        assert_eq!(fx.store.issue(&b).unwrap().column_order, 1);
    }

    #[test]
    fn test_planning_move_sets_sprint_and_updates_timestamp() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let sprint = fx.sprint("sprint-k3x9");
        fx.clock.advance(chrono::Duration::minutes(5));

        fx.engine()
            .reorder(&a, &Destination::Sprint(sprint.clone()), &Anchor::End)
            .unwrap();

        let moved = fx.store.issue(&a).unwrap();
        assert_eq!(moved.sprint_id, Some(sprint));
        assert_eq!(moved.status_id.as_str(), "todo");
        assert_eq!(moved.updated_at, start() + chrono::Duration::minutes(5));
    }

    #[test]
    fn test_self_anchor_is_rejected_without_mutation() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let sprint = fx.sprint("sprint-k3x9");

        let result = fx
            .engine()
            .reorder(&a, &Destination::Sprint(sprint), &Anchor::Before(a.clone()));

        assert!(matches!(result, Err(Error::SelfAnchor(id)) if id == a));
        assert!(fx.store.issue(&a).unwrap().sprint_id.is_none());
    }

    #[test]
    fn test_anchor_outside_destination_appends() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let b = fx.issue("B");
        let c = fx.issue("C");
        let sprint = fx.sprint("sprint-k3x9");
        fx.engine()
            .reorder(&a, &Destination::Sprint(sprint.clone()), &Anchor::End)
            .unwrap();

        // b sits in the backlog, not in the sprint
        let order = fx
            .engine()
            .reorder(&c, &Destination::Sprint(sprint), &Anchor::Before(b))
            .unwrap();

        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_unknown_targets_are_not_found() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");

        let missing_issue = fx.engine().reorder(
            &IssueId::new("demo-zzzz"),
            &Destination::Backlog,
            &Anchor::End,
        );
        assert!(matches!(
            missing_issue,
            Err(Error::NotFound {
                kind: EntityKind::Issue,
                ..
            })
        ));

        let missing_sprint = fx.engine().reorder(
            &a,
            &Destination::Sprint(SprintId::new("sprint-none")),
            &Anchor::End,
        );
        assert!(matches!(
            missing_sprint,
            Err(Error::NotFound {
                kind: EntityKind::Sprint,
                ..
            })
        ));

        let missing_column = fx.engine().reorder(
            &a,
            &Destination::Column(StatusId::new("review")),
            &Anchor::End,
        );
        assert!(matches!(
            missing_column,
            Err(Error::NotFound {
                kind: EntityKind::Column,
                ..
            })
        ));
    }

    #[test]
    fn test_append_to_plan_preserves_relative_order() {
        let mut fx = Fixture::new();
        let a = fx.issue("A");
        let b = fx.issue("B");
        let c = fx.issue("C");
        let sprint = fx.sprint("sprint-k3x9");
        for id in [&b, &c] {
            fx.engine()
                .reorder(id, &Destination::Sprint(sprint.clone()), &Anchor::End)
                .unwrap();
        }

        let project = fx.project.clone();
        let appended = fx
            .engine()
            .append_to_plan(&project, None, &[c.clone(), b.clone()]);

        assert_eq!(appended, vec![c.clone(), b.clone()]);
        assert_eq!(fx.store.plan_members(&project, None), vec![a, c, b]);
    }

    #[test]
    fn test_anchor_serde_shape() {
        let json = serde_json::to_value(Anchor::Before(IssueId::new("demo-a1b2"))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "before", "id": "demo-a1b2"}));

        let end: Anchor = serde_json::from_value(serde_json::json!({"kind": "end"})).unwrap();
        assert_eq!(end, Anchor::End);

        let backlog = serde_json::to_value(Destination::Backlog).unwrap();
        assert_eq!(backlog, serde_json::json!({"kind": "backlog"}));
    }
}
