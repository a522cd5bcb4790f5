//! Task record and lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AgentAnalysis, GenerationResult};

/// Lifecycle state of a task, modeled so illegal combinations are
/// unrepresentable: a result exists only inside `Completed`, an error
/// message only inside `Failed`.
///
/// Transitions: `Pending → Processing → Completed | Failed`, plus the
/// degenerate `Pending → Completed` (zero-work) and `Pending → Failed`
/// (routing rejected the request). Terminal states accept no further
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    /// Accepted but not yet started.
    Pending,
    /// The pipeline has reported progress at least once.
    Processing { progress: u8 },
    /// Terminal success; progress is implicitly 100.
    Completed { result: GenerationResult },
    /// Terminal failure. `progress` is the last value seen before the
    /// failure and carries no meaning beyond diagnostics.
    Failed { progress: u8, error: String },
}

impl TaskState {
    /// Returns `true` once the task can never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed { .. } | TaskState::Failed { .. }
        )
    }

    /// The flat status tag for wire responses.
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Processing { .. } => TaskStatus::Processing,
            TaskState::Completed { .. } => TaskStatus::Completed,
            TaskState::Failed { .. } => TaskStatus::Failed,
        }
    }

    /// Scalar progress for polling clients: 0 while pending, the reported
    /// value while processing, fixed at 100 on completion, last known on
    /// failure.
    pub fn progress(&self) -> u8 {
        match self {
            TaskState::Pending => 0,
            TaskState::Processing { progress } => *progress,
            TaskState::Completed { .. } => 100,
            TaskState::Failed { progress, .. } => *progress,
        }
    }
}

/// Flat, data-free status tag exposed to clients.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Polling clients stop on the first terminal status they observe.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// The complete record for a single task, owned by the [`TaskStore`].
///
/// [`TaskStore`]: crate::store::TaskStore
#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: Uuid,
    pub prompt: String,
    pub reference_images: Vec<String>,
    /// Set at most once, never cleared or overwritten.
    pub analysis: Option<AgentAnalysis>,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(task_id: Uuid, prompt: String, reference_images: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            prompt,
            reference_images,
            analysis: None,
            state: TaskState::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produce an owned, consistent read view of the task.
    ///
    /// Built under the shard lock in one piece, so a reader can never see
    /// e.g. `status == COMPLETED` with a missing result.
    pub fn snapshot(&self) -> TaskSnapshot {
        let (result, error_message) = match &self.state {
            TaskState::Completed { result } => (Some(result.clone()), None),
            TaskState::Failed { error, .. } => (None, Some(error.clone())),
            _ => (None, None),
        };
        TaskSnapshot {
            task_id: self.task_id,
            status: self.state.status(),
            progress: self.state.progress(),
            analysis: self.analysis.clone(),
            result,
            error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view of a task returned to callers and polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(rename = "agentAnalysis", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AgentAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
