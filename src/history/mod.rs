//! Undo/Redo system for staged storage changes.
//!
//! Before every staged action the whole device tree is snapshotted onto the
//! undo stack. Undo and redo swap whole snapshots with the live tree, so the
//! history never needs to know what an action did. Depth is capped in both
//! directions, and every transition updates which of the undo, redo, clear
//! and apply controls are clickable.
//!
//! ## Usage
//!
//! - **Ctrl+Z**: Undo the last staged action
//! - **Ctrl+Y** or **Ctrl+Shift+Z**: Redo the last undone action
//!
//! ## Module Structure
//!
//! - [`action_history`] - ActionHistory ledger and the SnapshotSource trait
//! - [`affordance`] - Affordance names and the sink they are reported to
//! - [`bounded_stack`] - Fixed-capacity stack with oldest-first eviction
//! - [`error`] - HistoryError
//! - [`systems`] - Bevy systems for shortcuts and undo/redo requests

mod action_history;
mod affordance;
mod bounded_stack;
mod error;
mod systems;

#[cfg(test)]
mod tests;

// Re-exports
pub use action_history::{ActionHistory, SnapshotSource};
pub use affordance::{Affordance, AffordanceSink};
pub use error::{HistoryError, HistoryResult};

use bevy::prelude::*;

use crate::devices::DeviceTree;

/// Maximum number of snapshots kept in each direction
pub(crate) const MAX_HISTORY_SIZE: usize = 5;

/// Session-wide history of the live device tree
#[derive(Resource, Default, Deref, DerefMut)]
pub struct DeviceHistory(pub ActionHistory<DeviceTree>);

/// Message to step back one staged action
#[derive(Message)]
pub struct UndoRequest;

/// Message to step forward one undone action
#[derive(Message)]
pub struct RedoRequest;

pub struct HistoryPlugin;

impl Plugin for HistoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeviceHistory>()
            .add_message::<UndoRequest>()
            .add_message::<RedoRequest>()
            .add_systems(
                Update,
                (
                    systems::handle_undo_shortcut,
                    systems::handle_redo_shortcut,
                    systems::undo_system
                        .run_if(on_message::<UndoRequest>)
                        .after(systems::handle_undo_shortcut),
                    systems::redo_system
                        .run_if(on_message::<RedoRequest>)
                        .after(systems::handle_redo_shortcut),
                ),
            );
    }
}
