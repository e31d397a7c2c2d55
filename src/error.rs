// Error taxonomy for the task store

use std::path::PathBuf;
use thiserror::Error;

/// Recoverable store errors
///
/// These travel inside `eyre::Report`; callers that need to react to a
/// specific case use `report.downcast_ref::<StoreError>()`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Task text was empty or whitespace-only; nothing was mutated
    #[error("Task text cannot be empty or whitespace-only")]
    EmptyText,

    /// The task file exists but is not an array of task objects
    #[error("Task file {path:?} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StoreError::Corrupted { .. })
    }
}
