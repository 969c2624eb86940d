//! Writing staged actions out as a plan file on apply.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::actions::StagedAction;
use super::tree::DeviceTree;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("nothing has been staged")]
    NothingStaged,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to carry out the staged changes elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub created_at: String,
    pub actions: Vec<StagedAction>,
    /// Resulting layout, without the pending list
    pub layout: DeviceTree,
}

impl Plan {
    pub fn from_tree(tree: &DeviceTree) -> Result<Self, PlanError> {
        if !tree.has_pending() {
            return Err(PlanError::NothingStaged);
        }

        let layout = DeviceTree {
            pending: Vec::new(),
            ..tree.clone()
        };
        Ok(Self {
            created_at: chrono::Local::now().to_rfc3339(),
            actions: tree.pending.clone(),
            layout,
        })
    }

    /// `plan-<stamp>.json`, or `plan-<stamp>-<n>.json` for later plans in the same second
    pub fn file_name(&self, attempt: u32) -> String {
        let stamp = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.format("%Y%m%d-%H%M%S").to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        match attempt {
            0 => format!("plan-{}.json", stamp),
            n => format!("plan-{}-{}.json", stamp, n),
        }
    }
}

/// Export the pending actions into `dir` and return the written path.
///
/// The tree itself is left alone; clearing `pending` is up to the caller once
/// the file is safely on disk. Existing plans are never overwritten.
pub fn write_plan(tree: &DeviceTree, dir: &Path) -> Result<PathBuf, PlanError> {
    let plan = Plan::from_tree(tree)?;
    let json = serde_json::to_string_pretty(&plan)?;
    std::fs::create_dir_all(dir)?;

    let mut attempt = 0;
    loop {
        let path = dir.join(plan.file_name(attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
