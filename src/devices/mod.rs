//! The storage layout being edited and the changes staged against it.
//!
//! ## Module Structure
//!
//! - [`tree`] - DeviceTree resource (disks, partitions, volume groups, logical volumes)
//! - [`actions`] - StagedAction and its validation
//! - [`probe`] - Reading the initial layout from sysfs
//! - [`demo`] - Built-in layout for trying things out
//! - [`plan`] - Plan file export on apply
//! - [`format`] - Size labels
//! - [`systems`] - Bevy systems for staging, clearing and applying

mod actions;
pub(crate) mod demo;
mod format;
mod plan;
mod probe;
mod systems;
mod tree;

pub use actions::StagedAction;
pub use format::{format_size, SizeUnit};
pub use tree::{DeviceTree, Disk, VolumeGroup};

use bevy::prelude::*;

use crate::config::ConfigLoaded;

/// Layout as of startup or the last apply; "clear" returns here
#[derive(Resource, Default)]
pub struct PristineTree(pub DeviceTree);

/// Outcome of the last apply, shown in the status bar
#[derive(Resource, Default)]
pub struct ApplyStatus {
    pub message: Option<String>,
}

/// Message to stage a new action against the live tree
#[derive(Message)]
pub struct StageActionRequest {
    pub action: StagedAction,
}

/// Message to discard every staged action
#[derive(Message)]
pub struct ClearStagedRequest;

/// Message to export staged actions and start from the result
#[derive(Message)]
pub struct ApplyRequest;

pub struct DevicesPlugin;

impl Plugin for DevicesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeviceTree>()
            .init_resource::<PristineTree>()
            .init_resource::<ApplyStatus>()
            .add_message::<StageActionRequest>()
            .add_message::<ClearStagedRequest>()
            .add_message::<ApplyRequest>()
            .add_systems(Startup, systems::load_devices_system.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    systems::stage_action_system.run_if(on_message::<StageActionRequest>),
                    systems::clear_staged_system.run_if(on_message::<ClearStagedRequest>),
                    systems::apply_system.run_if(on_message::<ApplyRequest>),
                ),
            );
    }
}
