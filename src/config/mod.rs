use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::devices::SizeUnit;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfigData {
    /// Unit for sizes shown in the device panel
    #[serde(default)]
    pub size_unit: SizeUnit,

    /// Skip sysfs probing and edit the built-in demo layout
    #[serde(default)]
    pub use_demo_devices: bool,

    /// Where apply writes plan files (defaults to `{data_dir}/plans`)
    #[serde(default)]
    pub plans_dir: Option<PathBuf>,
}

impl AppConfigData {
    pub fn plans_dir(&self) -> PathBuf {
        self.plans_dir
            .clone()
            .unwrap_or_else(crate::paths::default_plans_dir)
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to change the displayed size unit
#[derive(Message)]
pub struct SetSizeUnitRequest {
    pub unit: SizeUnit,
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AppConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Parse config JSON, falling back to defaults with a reason on failure
fn parse_config(json: &str) -> LoadConfigResult {
    match serde_json::from_str(json) {
        Ok(data) => LoadConfigResult {
            data,
            reset_reason: None,
        },
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            LoadConfigResult {
                data: AppConfigData::default(),
                reset_reason: Some(format!("Configuration file was corrupted: {}", e)),
            }
        }
    }
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: AppConfigData::default(),
            reset_reason: None,
        };
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => {
            let result = parse_config(&json);
            if result.reset_reason.is_none() {
                info!("Loaded config from {:?}", config_path);
            }
            result
        }
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            LoadConfigResult {
                data: AppConfigData::default(),
                reset_reason: Some(format!("Could not read configuration file: {}", e)),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    if let Err(e) = crate::paths::ensure_directories(&config.data.plans_dir()) {
        warn!("Failed to create application directories: {}", e);
    }

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to change the size unit
fn set_size_unit_system(
    mut events: MessageReader<SetSizeUnitRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.size_unit == event.unit {
            continue;
        }
        config.data.size_unit = event.unit;
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Size unit set to {}", event.unit.display_name());
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetSizeUnitRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    set_size_unit_system.run_if(on_message::<SetSizeUnitRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.size_unit, SizeUnit::Auto);
        assert!(!data.use_demo_devices);
        assert!(data.plans_dir.is_none());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            size_unit: SizeUnit::GiB,
            use_demo_devices: true,
            plans_dir: Some(PathBuf::from("/var/lib/plans")),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.size_unit, data.size_unit);
        assert_eq!(parsed.use_demo_devices, data.use_demo_devices);
        assert_eq!(parsed.plans_dir, data.plans_dir);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let result = parse_config("{}");
        assert!(result.reset_reason.is_none());
        assert_eq!(result.data.size_unit, SizeUnit::Auto);
    }

    #[test]
    fn test_corrupted_config_resets() {
        let result = parse_config("{ not json");
        assert!(result.reset_reason.is_some());
        assert!(!result.data.use_demo_devices);
    }

    #[test]
    fn test_plans_dir_override() {
        let data = AppConfigData {
            plans_dir: Some(PathBuf::from("/tmp/plans")),
            ..Default::default()
        };
        assert_eq!(data.plans_dir(), PathBuf::from("/tmp/plans"));
    }

    #[test]
    fn test_load_config_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"size_unit":"MiB","use_demo_devices":true}"#).unwrap();

        let result = load_config(&path);
        assert!(result.reset_reason.is_none());
        assert_eq!(result.data.size_unit, SizeUnit::MiB);
        assert!(result.data.use_demo_devices);
    }
}
