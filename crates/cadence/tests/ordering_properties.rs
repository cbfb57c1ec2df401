//! Property tests for issue ordering across random move sequences.

use cadence::domain::{IssueId, SprintId, StatusId};
use cadence::ordering::{Anchor, Destination};
use proptest::prelude::*;

mod common;
use common::World;

const ISSUES: usize = 6;
const COLUMNS: [&str; 3] = ["todo", "in_progress", "done"];

/// A move described by indexes into the fixture's issues and containers
#[derive(Debug, Clone)]
struct Move {
    issue: usize,
    destination: usize,
    anchor: Option<usize>,
}

fn moves() -> impl Strategy<Value = Vec<Move>> {
    // Destinations 0..3 are columns, 3..5 sprints and 5 the backlog.
    let one = (0..ISSUES, 0..6usize, proptest::option::of(0..ISSUES)).prop_map(
        |(issue, destination, anchor)| Move {
            issue,
            destination,
            anchor,
        },
    );
    proptest::collection::vec(one, 1..40)
}

struct Fixture {
    world: World,
    issues: Vec<IssueId>,
    sprints: Vec<SprintId>,
}

impl Fixture {
    fn new() -> Self {
        let mut world = World::new();
        let issues = (0..ISSUES).map(|i| world.issue(&format!("Issue {i}"))).collect();
        let sprints = vec![world.sprint(), world.sprint()];
        Self {
            world,
            issues,
            sprints,
        }
    }

    fn destination(&self, index: usize) -> Destination {
        match index {
            0..=2 => Destination::Column(StatusId::new(COLUMNS[index])),
            3 | 4 => Destination::Sprint(self.sprints[index - 3].clone()),
            _ => Destination::Backlog,
        }
    }

    fn apply(&mut self, mv: &Move) -> (Destination, Vec<IssueId>) {
        let issue = self.issues[mv.issue].clone();
        let destination = self.destination(mv.destination);
        let anchor = match mv.anchor {
            Some(a) if a != mv.issue => Anchor::Before(self.issues[a].clone()),
            _ => Anchor::End,
        };
        let sequence = self
            .world
            .ordering()
            .reorder(&issue, &destination, &anchor)
            .unwrap();
        (destination, sequence)
    }

    fn destination_orders(&self, destination: &Destination) -> Vec<u32> {
        match destination {
            Destination::Column(status) => self.world.column_orders(status.as_str()),
            Destination::Sprint(sprint) => self.world.plan_orders(Some(sprint)),
            Destination::Backlog => self.world.plan_orders(None),
        }
    }

    fn all_container_orders(&self) -> Vec<Vec<u32>> {
        let mut all: Vec<Vec<u32>> = COLUMNS
            .iter()
            .map(|status| self.world.column_orders(status))
            .collect();
        for sprint in &self.sprints {
            all.push(self.world.plan_orders(Some(sprint)));
        }
        all.push(self.world.plan_orders(None));
        all
    }
}

fn strictly_increasing(orders: &[u32]) -> bool {
    orders.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn destination_is_contiguous_after_every_move(script in moves()) {
        let mut fixture = Fixture::new();
        for mv in &script {
            let (destination, sequence) = fixture.apply(mv);
            let orders = fixture.destination_orders(&destination);
            let expected: Vec<u32> = (0..u32::try_from(sequence.len()).unwrap()).collect();
            prop_assert_eq!(orders, expected);
        }
    }

    #[test]
    fn no_container_ever_holds_duplicate_orders(script in moves()) {
        let mut fixture = Fixture::new();
        for mv in &script {
            fixture.apply(mv);
            for orders in fixture.all_container_orders() {
                prop_assert!(strictly_increasing(&orders), "orders {:?}", orders);
            }
        }
    }

    #[test]
    fn every_issue_stays_in_exactly_one_container_per_dimension(script in moves()) {
        let mut fixture = Fixture::new();
        for mv in &script {
            fixture.apply(mv);
        }
        let world = &fixture.world;
        let column_total: usize = COLUMNS
            .iter()
            .map(|s| world.store.column_members(&world.project, &StatusId::new(*s)).len())
            .sum();
        let plan_total: usize = fixture
            .sprints
            .iter()
            .map(|s| world.store.plan_members(&world.project, Some(s)).len())
            .sum::<usize>()
            + world.store.plan_members(&world.project, None).len();
        prop_assert_eq!(column_total, ISSUES);
        prop_assert_eq!(plan_total, ISSUES);
    }

    #[test]
    fn moving_the_last_member_to_the_end_changes_nothing(script in moves()) {
        let mut fixture = Fixture::new();
        let mut last = None;
        for mv in &script {
            last = Some(fixture.apply(mv));
        }
        let (destination, sequence) = last.unwrap();
        let tail = sequence.last().unwrap().clone();

        let before: Vec<(IssueId, u32, u32)> = fixture
            .world
            .store
            .issues()
            .map(|i| (i.id.clone(), i.column_order, i.plan_order))
            .collect();

        let again = fixture
            .world
            .ordering()
            .reorder(&tail, &destination, &Anchor::End)
            .unwrap();

        let after: Vec<(IssueId, u32, u32)> = fixture
            .world
            .store
            .issues()
            .map(|i| (i.id.clone(), i.column_order, i.plan_order))
            .collect();
        prop_assert_eq!(again, sequence);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn column_moves_never_disturb_plan_order(script in moves()) {
        let mut fixture = Fixture::new();
        for mv in &script {
            let before: Vec<(IssueId, u32)> = fixture
                .world
                .store
                .issues()
                .map(|i| (i.id.clone(), i.plan_order))
                .collect();
            let (destination, _) = fixture.apply(mv);
            if matches!(destination, Destination::Column(_)) {
                let after: Vec<(IssueId, u32)> = fixture
                    .world
                    .store
                    .issues()
                    .map(|i| (i.id.clone(), i.plan_order))
                    .collect();
                prop_assert_eq!(before, after);
            }
        }
    }
}
