mod device_panel;
mod dialogs;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

/// egui draws through the primary camera
fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<device_panel::StagingInputs>()
            .add_systems(Startup, spawn_camera)
            // Top/bottom and side panels must render before the central panel
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    toolbar::status_bar_ui,
                    device_panel::pending_panel_ui,
                    device_panel::device_panel_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                dialogs::config_reset_notification_ui.after(device_panel::device_panel_ui),
            );
    }
}
