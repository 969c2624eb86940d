//! Snapshot-based undo/redo ledger.

use bevy::log::debug;

use super::affordance::{Affordance, AffordanceSink, Affordances};
use super::bounded_stack::BoundedStack;
use super::error::{HistoryError, HistoryResult, StackKind};
use super::MAX_HISTORY_SIZE;

/// Anything that can hand out a deep copy of its current state
pub trait SnapshotSource<S> {
    fn snapshot(&self) -> HistoryResult<S>;
}

/// Two bounded stacks of whole-state snapshots plus the sink that mirrors
/// their availability onto UI controls.
///
/// The live state is never held here. Callers pass it in to be snapshotted
/// and install whatever `undo`/`redo` hands back.
#[derive(Debug)]
pub struct ActionHistory<S, A: AffordanceSink = Affordances> {
    /// Pre-action snapshots (most recent last)
    undo_stack: BoundedStack<S>,
    /// Snapshots taken just before an undo (most recent last)
    redo_stack: BoundedStack<S>,
    sink: A,
}

impl<S, A: AffordanceSink + Default> Default for ActionHistory<S, A> {
    fn default() -> Self {
        Self::with_sink(A::default())
    }
}

#[allow(dead_code)]
impl<S, A: AffordanceSink> ActionHistory<S, A> {
    pub fn with_sink(sink: A) -> Self {
        Self {
            undo_stack: BoundedStack::new(MAX_HISTORY_SIZE),
            redo_stack: BoundedStack::new(MAX_HISTORY_SIZE),
            sink,
        }
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// For controls whose state also depends on things outside the history,
    /// such as whether anything is staged
    pub fn sink_mut(&mut self) -> &mut A {
        &mut self.sink
    }

    /// Record the state as it was before an action.
    ///
    /// `clear_redo` is true for fresh user actions and false when the entry
    /// comes from walking forward through redo.
    pub fn record_action(
        &mut self,
        current_state: &impl SnapshotSource<S>,
        clear_redo: bool,
    ) -> HistoryResult<()> {
        let snapshot = current_state.snapshot()?;
        self.push_undo(snapshot, clear_redo);
        Ok(())
    }

    /// Record a state onto the redo stack
    pub fn record_redo_entry(&mut self, current_state: &impl SnapshotSource<S>) -> HistoryResult<()> {
        let snapshot = current_state.snapshot()?;
        self.push_redo(snapshot);
        Ok(())
    }

    /// Step back one action, returning the state the caller should install.
    pub fn undo(&mut self, current_state: &impl SnapshotSource<S>) -> HistoryResult<S> {
        if self.undo_stack.is_empty() {
            return Err(HistoryError::EmptyHistory {
                stack: StackKind::Undo,
            });
        }

        let current = current_state.snapshot()?;
        self.push_redo(current);
        self.sink.enable(&[Affordance::Undo, Affordance::Redo]);

        let restored = self.undo_stack.pop().ok_or(HistoryError::EmptyHistory {
            stack: StackKind::Undo,
        })?;
        if self.undo_stack.is_empty() {
            self.sink
                .disable(&[Affordance::Undo, Affordance::Clear, Affordance::Apply]);
        }

        debug!(
            "undo: {} undo / {} redo entries left",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Ok(restored)
    }

    /// Step forward one undone action, returning the state to install.
    pub fn redo(&mut self, current_state: &impl SnapshotSource<S>) -> HistoryResult<S> {
        if self.redo_stack.is_empty() {
            return Err(HistoryError::EmptyHistory {
                stack: StackKind::Redo,
            });
        }

        // Must not wipe the redo stack mid-traversal
        let current = current_state.snapshot()?;
        self.push_undo(current, false);

        let restored = self.redo_stack.pop().ok_or(HistoryError::EmptyHistory {
            stack: StackKind::Redo,
        })?;
        if self.redo_stack.is_empty() {
            self.sink.disable(&[Affordance::Redo]);
        }
        self.sink.enable(&[Affordance::Clear, Affordance::Apply]);

        debug!(
            "redo: {} undo / {} redo entries left",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Ok(restored)
    }

    /// Drop every snapshot in both directions
    pub fn clear_history(&mut self) {
        self.sink.disable(&[Affordance::Undo, Affordance::Redo]);
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo snapshots, oldest first
    pub fn undo_entries(&self) -> impl Iterator<Item = &S> {
        self.undo_stack.iter()
    }

    /// Redo snapshots, oldest first
    pub fn redo_entries(&self) -> impl Iterator<Item = &S> {
        self.redo_stack.iter()
    }

    fn push_undo(&mut self, snapshot: S, clear_redo: bool) {
        self.sink.enable(&[Affordance::Undo]);
        if self.undo_stack.push(snapshot).is_some() {
            debug!("undo history full, dropped oldest snapshot");
        }

        if clear_redo {
            self.redo_stack.clear();
            self.sink.disable(&[Affordance::Redo]);
        }
    }

    fn push_redo(&mut self, snapshot: S) {
        self.sink
            .enable(&[Affordance::Undo, Affordance::Clear, Affordance::Apply]);
        if self.redo_stack.push(snapshot).is_some() {
            debug!("redo history full, dropped oldest snapshot");
        }
    }
}
