mod config;
mod constants;
mod devices;
mod history;
mod logging;
mod paths;
mod ui;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

fn main() {
    let _log_guard = logging::init();

    let default_plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Partstage".into(),
            resolution: (DEFAULT_WINDOW_WIDTH as u32, DEFAULT_WINDOW_HEIGHT as u32).into(),
            ..default()
        }),
        ..default()
    });

    // Our own subscriber is already installed in debug builds
    #[cfg(debug_assertions)]
    let default_plugins = default_plugins.disable::<bevy::log::LogPlugin>();

    App::new()
        .add_plugins(default_plugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(config::ConfigPlugin)
        .add_plugins(devices::DevicesPlugin)
        .add_plugins(history::HistoryPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
