//! Bevy systems for staging, clearing and applying changes.

use bevy::prelude::*;
use thiserror::Error;

use crate::config::AppConfig;
use crate::history::{ActionHistory, Affordance, AffordanceSink, DeviceHistory, HistoryError};

use super::actions::{ActionError, StagedAction};
use super::plan::{write_plan, PlanError};
use super::probe::load_device_tree;
use super::tree::DeviceTree;
use super::{ApplyRequest, ApplyStatus, ClearStagedRequest, PristineTree, StageActionRequest};

#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Apply `action` to a copy of the tree, record the pre-action state, then
/// install the copy.
///
/// Nothing is recorded and the live tree is untouched if the action or the
/// snapshot fails.
pub fn stage_action(
    tree: &mut DeviceTree,
    history: &mut ActionHistory<DeviceTree>,
    action: &StagedAction,
) -> Result<(), StageError> {
    let mut staged = tree.clone();
    action.apply_to(&mut staged)?;
    history.record_action(&*tree, true)?;
    *tree = staged;
    history
        .sink_mut()
        .enable(&[Affordance::Clear, Affordance::Apply]);
    Ok(())
}

/// Return to the pristine layout and forget all history
pub fn clear_staged(
    tree: &mut DeviceTree,
    pristine: &DeviceTree,
    history: &mut ActionHistory<DeviceTree>,
) {
    *tree = pristine.clone();
    history.clear_history();
    history
        .sink_mut()
        .disable(&[Affordance::Clear, Affordance::Apply]);
}

/// Export the plan, then make the result the new starting point
pub fn apply_staged(
    tree: &mut DeviceTree,
    pristine: &mut DeviceTree,
    history: &mut ActionHistory<DeviceTree>,
    plans_dir: &std::path::Path,
) -> Result<std::path::PathBuf, PlanError> {
    let path = write_plan(tree, plans_dir)?;
    tree.pending.clear();
    *pristine = tree.clone();
    history.clear_history();
    history
        .sink_mut()
        .disable(&[Affordance::Clear, Affordance::Apply]);
    Ok(path)
}

/// Startup system to populate the tree once config is known
pub fn load_devices_system(
    config: Res<AppConfig>,
    mut tree: ResMut<DeviceTree>,
    mut pristine: ResMut<PristineTree>,
) {
    *tree = load_device_tree(&config.data);
    pristine.0 = tree.clone();
}

pub fn stage_action_system(
    mut events: MessageReader<StageActionRequest>,
    mut tree: ResMut<DeviceTree>,
    mut history: ResMut<DeviceHistory>,
) {
    for event in events.read() {
        match stage_action(&mut tree, &mut history, &event.action) {
            Ok(()) => info!("Staged: {}", event.action.describe()),
            Err(e) => warn!("Could not stage '{}': {}", event.action.describe(), e),
        }
    }
}

pub fn clear_staged_system(
    mut events: MessageReader<ClearStagedRequest>,
    mut tree: ResMut<DeviceTree>,
    pristine: Res<PristineTree>,
    mut history: ResMut<DeviceHistory>,
) {
    for _ in events.read() {
        let discarded = tree.pending.len();
        clear_staged(&mut tree, &pristine.0, &mut history);
        info!("Discarded {} staged action(s)", discarded);
    }
}

pub fn apply_system(
    mut events: MessageReader<ApplyRequest>,
    config: Res<AppConfig>,
    mut tree: ResMut<DeviceTree>,
    mut pristine: ResMut<PristineTree>,
    mut history: ResMut<DeviceHistory>,
    mut status: ResMut<ApplyStatus>,
) {
    for _ in events.read() {
        let plans_dir = config.data.plans_dir();
        match apply_staged(&mut tree, &mut pristine.0, &mut history, &plans_dir) {
            Ok(path) => {
                info!("Plan written to {:?}", path);
                status.message = Some(format!("Plan written to {}", path.display()));
            }
            Err(PlanError::NothingStaged) => {
                warn!("Apply requested with nothing staged");
            }
            Err(e) => {
                error!("Failed to write plan: {}", e);
                status.message = Some(format!("Apply failed: {}", e));
            }
        }
    }
}
