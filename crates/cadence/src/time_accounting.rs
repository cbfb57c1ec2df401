//! Time logs and the per-issue `time_spent` counter.
//!
//! `time_spent` is maintained incrementally: every operation that changes a
//! closed log's duration applies the difference to the owning issue, and
//! open logs contribute nothing until they are stopped. Under that rule the
//! counter always equals [`EntityStore::sum_closed_durations`] for the issue.
//!
//! Each user has at most one open timer. Starting a new one stops the
//! previous one first.
//!
//! # Concurrency
//!
//! `start_timer` scans a user's open logs and then writes, so concurrent
//! writers must hold a per-user lock around `start_timer` and `stop_timer`.

use crate::clock::Clock;
use crate::domain::{IssueId, TimeLog, TimeLogId, UserId};
use crate::error::Result;
use crate::id_generation::IdKind;
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of [`TimeAccounting::start_timer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStart {
    /// The newly opened log
    pub log: TimeLog,
    /// The user's previously running timers, now closed
    pub auto_stopped: Vec<TimeLog>,
}

/// Records time against the issues of an [`EntityStore`].
pub struct TimeAccounting<'a> {
    store: &'a mut EntityStore,
    clock: &'a dyn Clock,
}

impl<'a> TimeAccounting<'a> {
    /// Create a time accounting view over a store
    pub fn new(store: &'a mut EntityStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Open a timer for `user` on `issue`, stopping the user's running
    /// timer if there is one.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown issue.
    pub fn start_timer(&mut self, issue: &IssueId, user: &UserId) -> Result<TimerStart> {
        self.store.require_issue(issue)?;
        let now = self.clock.now();

        let id = TimeLogId::new(self.store.generate_id(
            IdKind::TimeLog.prefix(),
            &[issue.as_str(), user.as_str()],
            now,
        )?);

        let mut auto_stopped = Vec::new();
        for open in self.store.open_logs_for_user(user) {
            if let Some(log) = self.close(&open, now) {
                warn!(
                    log = %log.id,
                    issue = %log.issue_id,
                    user = %user,
                    duration = log.duration_seconds,
                    "Stopped running timer before starting a new one"
                );
                auto_stopped.push(log);
            }
        }

        let log = TimeLog {
            id,
            issue_id: issue.clone(),
            user_id: user.clone(),
            start_time: now,
            end_time: None,
            duration_seconds: 0,
        };
        self.store.insert_time_log(log.clone());

        debug!(log = %log.id, issue = %issue, user = %user, "Started timer");
        Ok(TimerStart { log, auto_stopped })
    }

    /// Stop a running timer and credit its duration to the issue.
    ///
    /// Stopping a closed log returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown log.
    pub fn stop_timer(&mut self, id: &TimeLogId) -> Result<TimeLog> {
        let log = self.store.require_time_log(id)?;
        if !log.is_open() {
            debug!(log = %id, "Timer already stopped");
            return Ok(log.clone());
        }

        let now = self.clock.now();
        let log = match self.close(id, now) {
            Some(log) => log,
            None => self.store.require_time_log(id)?.clone(),
        };
        debug!(log = %id, duration = log.duration_seconds, "Stopped timer");
        Ok(log)
    }

    /// Record a closed span of `seconds` on `date` and credit it.
    ///
    /// Running timers are not affected.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown issue.
    pub fn log_manual(
        &mut self,
        issue: &IssueId,
        user: &UserId,
        seconds: u64,
        date: DateTime<Utc>,
    ) -> Result<TimeLog> {
        self.store.require_issue(issue)?;

        let now = self.clock.now();
        let id = TimeLogId::new(self.store.generate_id(
            IdKind::TimeLog.prefix(),
            &[issue.as_str(), user.as_str(), "manual"],
            now,
        )?);
        let log = TimeLog {
            id,
            issue_id: issue.clone(),
            user_id: user.clone(),
            start_time: date,
            end_time: Some(date),
            duration_seconds: seconds,
        };
        self.store.insert_time_log(log.clone());
        self.credit(issue, 0, seconds);

        debug!(log = %log.id, issue = %issue, seconds, "Logged manual time");
        Ok(log)
    }

    /// Overwrite a log's duration and move both timestamps to `date`.
    ///
    /// The issue counter moves by the difference, floored at zero. Editing a
    /// running timer closes it and credits the full new duration.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown log.
    pub fn edit_log(
        &mut self,
        id: &TimeLogId,
        seconds: u64,
        date: DateTime<Utc>,
    ) -> Result<TimeLog> {
        let log = self.store.require_time_log(id)?;
        let credited = if log.is_open() { 0 } else { log.duration_seconds };
        let issue = log.issue_id.clone();

        let log = self.store.require_time_log_mut(id)?;
        log.duration_seconds = seconds;
        log.start_time = date;
        log.end_time = Some(date);
        let log = log.clone();

        self.credit(&issue, credited, seconds);
        debug!(log = %id, old = credited, new = seconds, "Edited time log");
        Ok(log)
    }

    /// Remove a log, withdrawing its duration from the issue.
    ///
    /// A running timer is removed without touching the counter.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown log.
    pub fn delete_log(&mut self, id: &TimeLogId) -> Result<TimeLog> {
        let log = self.store.require_time_log(id)?.clone();
        self.store.remove_time_log(id);

        if !log.is_open() {
            self.credit(&log.issue_id, log.duration_seconds, 0);
        }
        debug!(log = %id, "Deleted time log");
        Ok(log)
    }

    /// Close an open log at `now` and credit its duration.
    fn close(&mut self, id: &TimeLogId, now: DateTime<Utc>) -> Option<TimeLog> {
        let log = self.store.time_log_mut(id)?;
        if !log.is_open() {
            return None;
        }

        let seconds = u64::try_from((now - log.start_time).num_seconds()).unwrap_or(0);
        log.end_time = Some(now);
        log.duration_seconds = seconds;
        let log = log.clone();

        self.credit(&log.issue_id, 0, seconds);
        Some(log)
    }

    /// Move an issue's counter from an old contribution to a new one.
    fn credit(&mut self, issue_id: &IssueId, old: u64, new: u64) {
        let now = self.clock.now();
        let Some(issue) = self.store.issue_mut(issue_id) else {
            warn!(issue = %issue_id, "Time log refers to a missing issue");
            return;
        };

        issue.time_spent = if new >= old {
            issue.time_spent.saturating_add(new - old)
        } else {
            issue.time_spent.saturating_sub(old - new)
        };
        issue.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{EntityKind, NewIssue, ProjectId};
    use crate::error::Error;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    struct Fixture {
        store: EntityStore,
        clock: ManualClock,
        project: ProjectId,
        alice: UserId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = EntityStore::new();
            let project = store.create_project("Demo", "DEMO", t0()).unwrap().id;
            Self {
                store,
                clock: ManualClock::new(t0()),
                project,
                alice: UserId::new("alice"),
            }
        }

        fn issue(&mut self, title: &str) -> IssueId {
            let input = NewIssue {
                project_id: self.project.clone(),
                title: title.to_string(),
                ..Default::default()
            };
            self.store.create_issue(input, "demo", t0()).unwrap().id
        }

        fn time(&mut self) -> TimeAccounting<'_> {
            TimeAccounting::new(&mut self.store, &self.clock)
        }

        fn spent(&self, issue: &IssueId) -> u64 {
            self.store.issue(issue).unwrap().time_spent
        }
    }

    #[test]
    fn test_stop_credits_elapsed_seconds() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let started = fx.time().start_timer(&x, &alice).unwrap();
        assert!(started.log.is_open());
        assert!(started.auto_stopped.is_empty());

        fx.clock.advance(Duration::seconds(3600));
        let stopped = fx.time().stop_timer(&started.log.id).unwrap();

        assert_eq!(stopped.duration_seconds, 3600);
        assert_eq!(stopped.end_time, Some(t0() + Duration::seconds(3600)));
        assert_eq!(fx.spent(&x), 3600);
    }

    #[test]
    fn test_duration_floors_partial_seconds() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().start_timer(&x, &alice).unwrap().log;
        fx.clock.advance(Duration::milliseconds(90_999));
        let stopped = fx.time().stop_timer(&log.id).unwrap();

        assert_eq!(stopped.duration_seconds, 90);
    }

    #[test]
    fn test_stopping_twice_is_a_no_op() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().start_timer(&x, &alice).unwrap().log;
        fx.clock.advance(Duration::seconds(60));
        fx.time().stop_timer(&log.id).unwrap();
        fx.clock.advance(Duration::seconds(60));
        let again = fx.time().stop_timer(&log.id).unwrap();

        assert_eq!(again.duration_seconds, 60);
        assert_eq!(fx.spent(&x), 60);
    }

    #[test]
    fn test_starting_a_timer_stops_the_running_one() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let y = fx.issue("Y");
        let alice = fx.alice.clone();

        let first = fx.time().start_timer(&x, &alice).unwrap().log;
        fx.clock.advance(Duration::seconds(120));
        let second = fx.time().start_timer(&y, &alice).unwrap();

        assert_eq!(second.auto_stopped.len(), 1);
        assert_eq!(second.auto_stopped[0].id, first.id);
        assert_eq!(fx.spent(&x), 120);
        assert_eq!(fx.store.open_logs_for_user(&alice), vec![second.log.id]);
    }

    #[test]
    fn test_timers_of_other_users_are_independent() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();
        let bob = UserId::new("bob");

        fx.time().start_timer(&x, &alice).unwrap();
        let bobs = fx.time().start_timer(&x, &bob).unwrap();

        assert!(bobs.auto_stopped.is_empty());
        assert_eq!(fx.store.open_logs_for_user(&alice).len(), 1);
    }

    #[test]
    fn test_edit_applies_signed_difference() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().start_timer(&x, &alice).unwrap().log;
        fx.clock.advance(Duration::seconds(3600));
        fx.time().stop_timer(&log.id).unwrap();

        let date = t0() + Duration::days(1);
        let edited = fx.time().edit_log(&log.id, 1800, date).unwrap();

        assert_eq!(edited.start_time, date);
        assert_eq!(edited.end_time, Some(date));
        assert_eq!(fx.spent(&x), 1800);

        fx.time().edit_log(&log.id, 5400, date).unwrap();
        assert_eq!(fx.spent(&x), 5400);
    }

    #[test]
    fn test_editing_open_log_closes_it() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().start_timer(&x, &alice).unwrap().log;
        let edited = fx.time().edit_log(&log.id, 900, t0()).unwrap();

        assert!(!edited.is_open());
        assert_eq!(fx.spent(&x), 900);
        assert!(fx.store.open_logs_for_user(&alice).is_empty());
    }

    #[test]
    fn test_delete_withdraws_closed_duration_only() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let manual = fx.time().log_manual(&x, &alice, 600, t0()).unwrap();
        let running = fx.time().start_timer(&x, &alice).unwrap().log;
        assert_eq!(fx.spent(&x), 600);

        fx.time().delete_log(&running.id).unwrap();
        assert_eq!(fx.spent(&x), 600);

        fx.time().delete_log(&manual.id).unwrap();
        assert_eq!(fx.spent(&x), 0);
        assert!(fx.store.time_log(&manual.id).is_none());
    }

    #[test]
    fn test_counter_never_goes_negative() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().log_manual(&x, &alice, 100, t0()).unwrap();
        // Simulate a drifted counter restored from an old blob
        fx.store.issue_mut(&x).unwrap().time_spent = 30;

        fx.time().delete_log(&log.id).unwrap();
        assert_eq!(fx.spent(&x), 0);
    }

    #[test]
    fn test_clock_before_start_yields_zero_duration() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let alice = fx.alice.clone();

        let log = fx.time().start_timer(&x, &alice).unwrap().log;
        fx.clock.set(t0() - Duration::seconds(30));
        let stopped = fx.time().stop_timer(&log.id).unwrap();

        assert_eq!(stopped.duration_seconds, 0);
        assert_eq!(fx.spent(&x), 0);
    }

    #[test]
    fn test_failed_start_keeps_running_timer_open() {
        let mut fx = Fixture::new();
        let x = fx.issue("X");
        let y = fx.issue("Y");
        let alice = fx.alice.clone();
        let running = fx.time().start_timer(&x, &alice).unwrap().log;

        fx.clock.advance(Duration::seconds(60));
        let now = fx.clock.now();
        fx.store
            .exhaust_ids(IdKind::TimeLog.prefix(), &[y.as_str(), alice.as_str()], now);

        let result = fx.time().start_timer(&y, &alice);

        assert!(matches!(result, Err(Error::IdGeneration(_))));
        assert!(fx.store.time_log(&running.id).unwrap().is_open());
        assert_eq!(fx.store.open_logs_for_user(&alice), vec![running.id]);
        assert_eq!(fx.spent(&x), 0);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut fx = Fixture::new();
        let alice = fx.alice.clone();
        let missing = TimeLogId::new("log-none");

        assert!(matches!(
            fx.time().start_timer(&IssueId::new("demo-none"), &alice),
            Err(Error::NotFound {
                kind: EntityKind::Issue,
                ..
            })
        ));
        assert!(matches!(
            fx.time().stop_timer(&missing),
            Err(Error::NotFound {
                kind: EntityKind::TimeLog,
                ..
            })
        ));
        assert!(fx.time().edit_log(&missing, 10, t0()).is_err());
        assert!(fx.time().delete_log(&missing).is_err());
    }
}
