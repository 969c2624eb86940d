//! Bevy systems for handling undo/redo requests and keyboard shortcuts.

use bevy::prelude::*;

use crate::devices::DeviceTree;

use super::action_history::ActionHistory;
use super::affordance::{Affordance, AffordanceSink};
use super::error::{HistoryError, HistoryResult};
use super::{DeviceHistory, RedoRequest, UndoRequest};

/// Swap the live tree for the previous snapshot.
///
/// Undoing past evicted entries can leave staged actions behind, which must
/// stay clearable and applicable.
pub fn undo_tree(
    tree: &mut DeviceTree,
    history: &mut ActionHistory<DeviceTree>,
) -> HistoryResult<()> {
    *tree = history.undo(&*tree)?;
    if tree.has_pending() {
        history
            .sink_mut()
            .enable(&[Affordance::Clear, Affordance::Apply]);
    }
    Ok(())
}

/// Swap the live tree for the next undone snapshot
pub fn redo_tree(
    tree: &mut DeviceTree,
    history: &mut ActionHistory<DeviceTree>,
) -> HistoryResult<()> {
    *tree = history.redo(&*tree)?;
    Ok(())
}

/// System to handle undo keyboard shortcut (Ctrl+Z)
pub fn handle_undo_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<UndoRequest>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    // Ctrl+Z (without shift) = undo
    if ctrl && !shift && keyboard.just_pressed(KeyCode::KeyZ) {
        requests.write(UndoRequest);
    }
}

/// System to handle redo keyboard shortcut (Ctrl+Y or Ctrl+Shift+Z)
pub fn handle_redo_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<RedoRequest>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    // Ctrl+Y or Ctrl+Shift+Z = redo
    let redo_pressed = (ctrl && keyboard.just_pressed(KeyCode::KeyY))
        || (ctrl && shift && keyboard.just_pressed(KeyCode::KeyZ));

    if redo_pressed {
        requests.write(RedoRequest);
    }
}

pub fn undo_system(
    mut events: MessageReader<UndoRequest>,
    mut tree: ResMut<DeviceTree>,
    mut history: ResMut<DeviceHistory>,
) {
    for _ in events.read() {
        match undo_tree(&mut tree, &mut history) {
            Ok(()) => debug!("Undid last staged action"),
            // Shortcut pressed with nothing to undo
            Err(e @ HistoryError::EmptyHistory { .. }) => debug!("Undo ignored: {}", e),
            Err(e) => warn!("Undo failed: {}", e),
        }
    }
}

pub fn redo_system(
    mut events: MessageReader<RedoRequest>,
    mut tree: ResMut<DeviceTree>,
    mut history: ResMut<DeviceHistory>,
) {
    for _ in events.read() {
        match redo_tree(&mut tree, &mut history) {
            Ok(()) => debug!("Redid staged action"),
            Err(e @ HistoryError::EmptyHistory { .. }) => debug!("Redo ignored: {}", e),
            Err(e) => warn!("Redo failed: {}", e),
        }
    }
}
