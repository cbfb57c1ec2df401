//! Property tests for time log bookkeeping.

use cadence::domain::{IssueId, TimeLogId, UserId};
use chrono::Duration;
use proptest::prelude::*;
use std::collections::HashMap;

mod common;
use common::{World, t0};

const ISSUES: usize = 3;
const USERS: [&str; 2] = ["alice", "bob"];

#[derive(Debug, Clone)]
enum Op {
    Advance(i64),
    Start { issue: usize, user: usize },
    Stop(usize),
    Manual { issue: usize, user: usize, seconds: u64 },
    Edit { log: usize, seconds: u64 },
    Delete(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0i64..7200).prop_map(Op::Advance),
        (0..ISSUES, 0..USERS.len()).prop_map(|(issue, user)| Op::Start { issue, user }),
        any::<usize>().prop_map(Op::Stop),
        (0..ISSUES, 0..USERS.len(), 0u64..36_000)
            .prop_map(|(issue, user, seconds)| Op::Manual { issue, user, seconds }),
        (any::<usize>(), 0u64..36_000).prop_map(|(log, seconds)| Op::Edit { log, seconds }),
        any::<usize>().prop_map(Op::Delete),
    ];
    proptest::collection::vec(op, 1..60)
}

struct Fixture {
    world: World,
    issues: Vec<IssueId>,
    users: Vec<UserId>,
}

impl Fixture {
    fn new() -> Self {
        let mut world = World::new();
        let issues = (0..ISSUES).map(|i| world.issue(&format!("Issue {i}"))).collect();
        Self {
            world,
            issues,
            users: USERS.iter().map(|u| UserId::new(*u)).collect(),
        }
    }

    /// Pick an existing log by index, wrapping around
    fn log(&self, index: usize) -> Option<TimeLogId> {
        let logs: Vec<TimeLogId> = self.world.store.time_logs().map(|l| l.id.clone()).collect();
        if logs.is_empty() {
            None
        } else {
            Some(logs[index % logs.len()].clone())
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Advance(secs) => self.world.clock.advance(Duration::seconds(*secs)),
            Op::Start { issue, user } => {
                let (issue, user) = (self.issues[*issue].clone(), self.users[*user].clone());
                self.world.time().start_timer(&issue, &user).unwrap();
            }
            Op::Stop(index) => {
                if let Some(id) = self.log(*index) {
                    self.world.time().stop_timer(&id).unwrap();
                }
            }
            Op::Manual {
                issue,
                user,
                seconds,
            } => {
                let (issue, user) = (self.issues[*issue].clone(), self.users[*user].clone());
                self.world
                    .time()
                    .log_manual(&issue, &user, *seconds, t0())
                    .unwrap();
            }
            Op::Edit { log, seconds } => {
                if let Some(id) = self.log(*log) {
                    self.world.time().edit_log(&id, *seconds, t0()).unwrap();
                }
            }
            Op::Delete(index) => {
                if let Some(id) = self.log(*index) {
                    self.world.time().delete_log(&id).unwrap();
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn time_spent_matches_closed_logs(script in ops()) {
        let mut fixture = Fixture::new();
        for op in &script {
            fixture.apply(op);
            for issue in &fixture.issues {
                let spent = fixture.world.store.issue(issue).unwrap().time_spent;
                prop_assert_eq!(spent, fixture.world.store.sum_closed_durations(issue));
            }
        }
        prop_assert!(fixture.world.store.time_drift().is_empty());
    }

    #[test]
    fn each_user_has_at_most_one_running_timer(script in ops()) {
        let mut fixture = Fixture::new();
        for op in &script {
            fixture.apply(op);
            let mut open: HashMap<&UserId, usize> = HashMap::new();
            for log in fixture.world.store.time_logs().filter(|l| l.is_open()) {
                *open.entry(&log.user_id).or_default() += 1;
            }
            prop_assert!(open.values().all(|&n| n <= 1), "open timers {:?}", open);
        }
    }

    #[test]
    fn open_logs_never_carry_a_duration(script in ops()) {
        let mut fixture = Fixture::new();
        for op in &script {
            fixture.apply(op);
        }
        for log in fixture.world.store.time_logs().filter(|l| l.is_open()) {
            prop_assert_eq!(log.duration_seconds, 0);
        }
    }
}
