//! Errors produced by the lifecycle core.

use thiserror::Error;
use uuid::Uuid;

/// Everything that can go wrong when mutating or reading a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The referenced task does not exist.
    #[error("task not found: {task_id}")]
    NotFound { task_id: Uuid },

    /// A mutation was attempted on a terminal task, or an analysis
    /// re-attachment carried a conflicting value. The task is unchanged.
    #[error("invalid transition for task {task_id}: {reason}")]
    InvalidTransition { task_id: Uuid, reason: String },

    /// The request was rejected before a task was created.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl TaskError {
    pub(crate) fn invalid(task_id: Uuid, reason: impl Into<String>) -> Self {
        TaskError::InvalidTransition {
            task_id,
            reason: reason.into(),
        }
    }
}
