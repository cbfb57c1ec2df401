//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use cadence::clock::{Clock, ManualClock};
use cadence::domain::{IssueId, NewIssue, ProjectId, SprintId, StatusId, UserId, default_columns};
use cadence::ordering::OrderingEngine;
use cadence::sprint::SprintLifecycle;
use cadence::store::EntityStore;
use cadence::time_accounting::TimeAccounting;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::{Command, Output};

/// Fixed start instant for clock-driven tests
pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A store with one project on the default board, a manual clock and a user.
pub struct World {
    pub store: EntityStore,
    pub clock: ManualClock,
    pub project: ProjectId,
    pub user: UserId,
}

impl World {
    pub fn new() -> Self {
        let mut store = EntityStore::new();
        let project = store.create_project("Demo", "DEMO", t0()).unwrap().id;
        store
            .create_board(&project, "Board", default_columns(), t0())
            .unwrap();
        Self {
            store,
            clock: ManualClock::new(t0()),
            project,
            user: UserId::new("alice"),
        }
    }

    /// Create an issue in the first column and the backlog
    pub fn issue(&mut self, title: &str) -> IssueId {
        self.store
            .create_issue(
                NewIssue {
                    project_id: self.project.clone(),
                    title: title.to_string(),
                    ..Default::default()
                },
                "demo",
                self.clock.now(),
            )
            .unwrap()
            .id
    }

    /// Create a planned sprint
    pub fn sprint(&mut self) -> SprintId {
        let project = self.project.clone();
        self.sprints().create(&project, None).unwrap().id
    }

    pub fn ordering(&mut self) -> OrderingEngine<'_> {
        OrderingEngine::new(&mut self.store, &self.clock)
    }

    pub fn sprints(&mut self) -> SprintLifecycle<'_> {
        SprintLifecycle::new(&mut self.store, &self.clock)
    }

    pub fn time(&mut self) -> TimeAccounting<'_> {
        TimeAccounting::new(&mut self.store, &self.clock)
    }

    pub fn column_orders(&self, status: &str) -> Vec<u32> {
        self.store
            .column_members(&self.project, &StatusId::new(status))
            .iter()
            .map(|id| self.store.issue(id).unwrap().column_order)
            .collect()
    }

    pub fn plan_orders(&self, sprint: Option<&SprintId>) -> Vec<u32> {
        self.store
            .plan_members(&self.project, sprint)
            .iter()
            .map(|id| self.store.issue(id).unwrap().plan_order)
            .collect()
    }
}

// ============================================================================
// Binary helpers
// ============================================================================

/// Run the cadence binary in the specified directory
pub fn run_cadence_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cadence"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute cadence binary")
}

/// Run the binary and parse its stdout as JSON, asserting success
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_cadence_in_dir(dir, &full);
    assert!(
        output.status.success(),
        "cadence {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "cadence {args:?} printed invalid JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

/// Create an issue through the binary and return its id
pub fn create_issue(dir: &Path, title: &str) -> String {
    let issue = run_json(dir, &["issue", "create", title]);
    issue["id"].as_str().unwrap().to_string()
}
