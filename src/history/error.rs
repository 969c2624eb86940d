//! Error types for history transitions.

use thiserror::Error;

/// Which of the two history stacks an operation targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Undo,
    Redo,
}

impl std::fmt::Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackKind::Undo => f.write_str("undo"),
            StackKind::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to {stack}: the {stack} history is empty")]
    EmptyHistory { stack: StackKind },

    #[error("could not snapshot the device tree: {0}")]
    SnapshotFailure(String),
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;
