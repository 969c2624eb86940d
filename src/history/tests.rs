//! Unit tests for the history module.

use crate::devices::{DeviceTree, StagedAction};

use super::action_history::{ActionHistory, SnapshotSource};
use super::affordance::{Affordance, AffordanceSink, Affordances};
use super::error::{HistoryError, HistoryResult, StackKind};
use super::systems::{redo_tree, undo_tree};
use super::MAX_HISTORY_SIZE;

/// Stand-in for the live tree; a snapshot is just the current label
struct Live {
    state: &'static str,
    fail: bool,
}

impl Live {
    fn at(state: &'static str) -> Self {
        Self { state, fail: false }
    }
}

impl SnapshotSource<&'static str> for Live {
    fn snapshot(&self) -> HistoryResult<&'static str> {
        if self.fail {
            return Err(HistoryError::SnapshotFailure("out of memory".to_string()));
        }
        Ok(self.state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Enable(Vec<Affordance>),
    Disable(Vec<Affordance>),
}

/// Sink that remembers every notification alongside the resulting state
#[derive(Default)]
struct RecordingSink {
    calls: Vec<Call>,
    state: Affordances,
}

impl AffordanceSink for RecordingSink {
    fn enable(&mut self, names: &[Affordance]) {
        self.calls.push(Call::Enable(names.to_vec()));
        self.state.enable(names);
    }

    fn disable(&mut self, names: &[Affordance]) {
        self.calls.push(Call::Disable(names.to_vec()));
        self.state.disable(names);
    }
}

type TestHistory = ActionHistory<&'static str, RecordingSink>;

fn enabled(history: &TestHistory, affordance: Affordance) -> bool {
    history.sink().state.is_enabled(affordance)
}

#[test]
fn test_record_action_enables_undo() {
    let mut history = TestHistory::default();
    assert!(!history.can_undo());

    history.record_action(&Live::at("s0"), true).unwrap();

    assert!(history.can_undo());
    assert_eq!(history.undo_count(), 1);
    assert!(enabled(&history, Affordance::Undo));
    assert!(!enabled(&history, Affordance::Redo));
}

#[test]
fn test_undo_stack_evicts_oldest() {
    let mut history = TestHistory::default();

    for state in ["a", "b", "c", "d", "e", "f"] {
        history.record_action(&Live::at(state), true).unwrap();
    }

    assert_eq!(history.undo_count(), MAX_HISTORY_SIZE);
    let kept: Vec<_> = history.undo_entries().copied().collect();
    assert_eq!(kept, vec!["b", "c", "d", "e", "f"]);
}

#[test]
fn test_undo_stack_never_exceeds_bound() {
    let mut history = TestHistory::default();
    for _ in 0..50 {
        history.record_action(&Live::at("x"), true).unwrap();
        assert!(history.undo_count() <= MAX_HISTORY_SIZE);
    }
}

#[test]
fn test_redo_stack_evicts_oldest() {
    let mut history = TestHistory::default();
    for state in ["a", "b", "c", "d", "e", "f"] {
        history.record_redo_entry(&Live::at(state)).unwrap();
    }

    let kept: Vec<_> = history.redo_entries().copied().collect();
    assert_eq!(kept, vec!["b", "c", "d", "e", "f"]);
    assert!(enabled(&history, Affordance::Clear));
    assert!(enabled(&history, Affordance::Apply));
}

#[test]
fn test_fresh_action_clears_redo() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    history.record_action(&Live::at("s1"), true).unwrap();
    history.undo(&Live::at("s2")).unwrap();
    assert!(history.can_redo());
    assert!(enabled(&history, Affordance::Redo));

    history.record_action(&Live::at("s1"), true).unwrap();

    assert_eq!(history.redo_count(), 0);
    assert!(!enabled(&history, Affordance::Redo));
}

#[test]
fn test_record_without_clearing_keeps_redo() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    history.undo(&Live::at("s1")).unwrap();

    history.record_action(&Live::at("s0"), false).unwrap();

    assert_eq!(history.redo_count(), 1);
    assert!(enabled(&history, Affordance::Redo));
}

#[test]
fn test_undo_redo_round_trip() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();

    let restored = history.undo(&Live::at("s1")).unwrap();
    assert_eq!(restored, "s0");

    let replayed = history.redo(&Live::at(restored)).unwrap();
    assert_eq!(replayed, "s1");
}

#[test]
fn test_depth_tracking() {
    let mut history = TestHistory::default();
    for state in ["a", "b", "c"] {
        history.record_action(&Live::at(state), true).unwrap();
    }
    assert_eq!(history.undo_count(), 3);

    history.undo(&Live::at("d")).unwrap();

    assert_eq!(history.undo_count(), 2);
    assert_eq!(history.redo_count(), 1);
}

#[test]
fn test_undo_to_zero_disables_controls() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();

    history.undo(&Live::at("s1")).unwrap();

    assert!(!enabled(&history, Affordance::Undo));
    assert!(!enabled(&history, Affordance::Clear));
    assert!(!enabled(&history, Affordance::Apply));
    assert!(enabled(&history, Affordance::Redo));
}

#[test]
fn test_undo_notification_order() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    let before = history.sink().calls.len();

    history.undo(&Live::at("s1")).unwrap();

    assert_eq!(
        history.sink().calls[before..],
        [
            Call::Enable(vec![Affordance::Undo, Affordance::Clear, Affordance::Apply]),
            Call::Enable(vec![Affordance::Undo, Affordance::Redo]),
            Call::Disable(vec![Affordance::Undo, Affordance::Clear, Affordance::Apply]),
        ]
    );
}

#[test]
fn test_redo_to_zero_disables_redo() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    history.undo(&Live::at("s1")).unwrap();

    history.redo(&Live::at("s0")).unwrap();

    assert!(!enabled(&history, Affordance::Redo));
    assert!(enabled(&history, Affordance::Undo));
    assert!(enabled(&history, Affordance::Clear));
    assert!(enabled(&history, Affordance::Apply));
}

#[test]
fn test_clear_history_disables_undo_and_redo() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    history.record_action(&Live::at("s1"), true).unwrap();
    history.undo(&Live::at("s2")).unwrap();

    history.clear_history();

    assert_eq!(history.undo_count(), 0);
    assert_eq!(history.redo_count(), 0);
    assert!(!enabled(&history, Affordance::Undo));
    assert!(!enabled(&history, Affordance::Redo));

    // Also from a blank history
    let mut blank = TestHistory::default();
    blank.clear_history();
    assert!(!enabled(&blank, Affordance::Undo));
    assert!(!enabled(&blank, Affordance::Redo));
}

#[test]
fn test_empty_history_errors() {
    let mut history = TestHistory::default();

    assert_eq!(
        history.undo(&Live::at("s0")),
        Err(HistoryError::EmptyHistory {
            stack: StackKind::Undo
        })
    );
    assert_eq!(
        history.redo(&Live::at("s0")),
        Err(HistoryError::EmptyHistory {
            stack: StackKind::Redo
        })
    );
    assert!(history.sink().calls.is_empty());
}

#[test]
fn test_snapshot_failure_leaves_history_unchanged() {
    let mut history = TestHistory::default();
    history.record_action(&Live::at("s0"), true).unwrap();
    history.record_action(&Live::at("s1"), true).unwrap();
    history.undo(&Live::at("s2")).unwrap();
    let calls = history.sink().calls.clone();
    let failing = Live {
        state: "s1",
        fail: true,
    };

    assert!(matches!(
        history.record_action(&failing, true),
        Err(HistoryError::SnapshotFailure(_))
    ));
    assert!(matches!(
        history.record_redo_entry(&failing),
        Err(HistoryError::SnapshotFailure(_))
    ));
    assert!(matches!(
        history.undo(&failing),
        Err(HistoryError::SnapshotFailure(_))
    ));
    assert!(matches!(
        history.redo(&failing),
        Err(HistoryError::SnapshotFailure(_))
    ));

    assert_eq!(history.undo_entries().copied().collect::<Vec<_>>(), vec!["s0"]);
    assert_eq!(history.redo_entries().copied().collect::<Vec<_>>(), vec!["s2"]);
    assert_eq!(history.sink().calls, calls);
}

#[test]
fn test_branching_scenario() {
    let mut history = TestHistory::default();

    // Actions A, B and C take the tree s0 -> s1 -> s2 -> s3
    history.record_action(&Live::at("s0"), true).unwrap();
    history.record_action(&Live::at("s1"), true).unwrap();
    history.record_action(&Live::at("s2"), true).unwrap();
    assert_eq!((history.undo_count(), history.redo_count()), (3, 0));

    let live = history.undo(&Live::at("s3")).unwrap();
    assert_eq!(live, "s2");
    assert_eq!((history.undo_count(), history.redo_count()), (2, 1));

    let live = history.undo(&Live::at(live)).unwrap();
    assert_eq!(live, "s1");
    assert_eq!((history.undo_count(), history.redo_count()), (1, 2));

    let live = history.redo(&Live::at(live)).unwrap();
    assert_eq!(live, "s2");
    assert_eq!((history.undo_count(), history.redo_count()), (2, 1));

    // Action D branches off s2
    history.record_action(&Live::at(live), true).unwrap();
    assert_eq!(history.redo_count(), 0);
    assert_eq!(history.redo_entries().count(), 0);
    assert!(!enabled(&history, Affordance::Redo));
}

#[test]
fn test_device_tree_undo_redo() {
    let mut tree = crate::devices::demo::demo_tree();
    let original = tree.clone();
    let mut history: ActionHistory<DeviceTree> = ActionHistory::default();

    history.record_action(&tree, true).unwrap();
    StagedAction::DeleteLogicalVolume {
        volume_group: "fedora".to_string(),
        name: "swap".to_string(),
    }
    .apply_to(&mut tree)
    .unwrap();
    let staged = tree.clone();

    undo_tree(&mut tree, &mut history).unwrap();
    assert_eq!(tree, original);
    assert!(tree.pending.is_empty());

    redo_tree(&mut tree, &mut history).unwrap();
    assert_eq!(tree, staged);
    assert_eq!(tree.pending.len(), 1);

    assert!(matches!(
        redo_tree(&mut tree, &mut history),
        Err(HistoryError::EmptyHistory { .. })
    ));
}

#[test]
fn test_undo_past_evicted_entries_keeps_clear_and_apply() {
    let mut tree = crate::devices::demo::demo_tree();
    let mut history: ActionHistory<DeviceTree> = ActionHistory::default();

    for i in 0..MAX_HISTORY_SIZE + 1 {
        history.record_action(&tree, true).unwrap();
        StagedAction::CreateLogicalVolume {
            volume_group: "fedora".to_string(),
            name: format!("lv{}", i),
            size: 1024 * 1024,
            filesystem: None,
        }
        .apply_to(&mut tree)
        .unwrap();
    }

    while history.can_undo() {
        undo_tree(&mut tree, &mut history).unwrap();
    }

    assert_eq!(tree.pending.len(), 1);
    assert!(!history.sink().is_enabled(Affordance::Undo));
    assert!(history.sink().is_enabled(Affordance::Clear));
    assert!(history.sink().is_enabled(Affordance::Apply));
}

#[test]
fn test_undo_to_pristine_disables_clear_and_apply() {
    let mut tree = crate::devices::demo::demo_tree();
    let mut history: ActionHistory<DeviceTree> = ActionHistory::default();
    history.record_action(&tree, true).unwrap();
    StagedAction::DeleteLogicalVolume {
        volume_group: "fedora".to_string(),
        name: "swap".to_string(),
    }
    .apply_to(&mut tree)
    .unwrap();

    undo_tree(&mut tree, &mut history).unwrap();

    assert!(!tree.has_pending());
    assert!(!history.sink().is_enabled(Affordance::Clear));
    assert!(!history.sink().is_enabled(Affordance::Apply));
}
