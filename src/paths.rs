//! Where partstage keeps its config, plan exports and logs.
//!
//! `cargo run` and debug builds keep everything next to the working directory
//! (`./config.json`, `./plans/`, `./logs/`). Installed builds use
//! `~/.config/partstage/config.json` and `~/.local/share/partstage/{plans,logs}`
//! on Linux, and the platform data directory for both elsewhere.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "partstage";

/// True under `cargo run` or in a debug build
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

/// Resolved base directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub config: PathBuf,
    pub data: PathBuf,
}

impl AppDirs {
    pub fn resolve() -> Self {
        if is_dev_mode() {
            return Self::rooted(".");
        }

        let data = dirs::data_dir()
            .map(|p| p.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."));
        #[cfg(target_os = "linux")]
        let config = dirs::config_dir()
            .map(|p| p.join(APP_DIR))
            .unwrap_or_else(|| data.clone());
        #[cfg(not(target_os = "linux"))]
        let config = data.clone();

        Self { config, data }
    }

    /// Config and data both under `root`
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config: root.clone(),
            data: root,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.data.join("plans")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data.join("logs")
    }

    /// Create the config and log directories plus `plans_dir`, which may be a
    /// user override outside `data`
    pub fn ensure(&self, plans_dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config)?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(plans_dir)?;
        Ok(())
    }
}

pub fn config_file() -> PathBuf {
    AppDirs::resolve().config_file()
}

pub fn default_plans_dir() -> PathBuf {
    AppDirs::resolve().plans_dir()
}

#[cfg_attr(not(debug_assertions), allow(dead_code))]
pub fn logs_dir() -> PathBuf {
    AppDirs::resolve().logs_dir()
}

pub fn ensure_directories(plans_dir: &Path) -> std::io::Result<()> {
    AppDirs::resolve().ensure(plans_dir)
}
