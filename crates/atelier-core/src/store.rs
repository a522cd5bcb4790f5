//! Sharded, thread-safe task store.
//!
//! Each task id is routed to one of N independently lockable partitions,
//! so writes to one task serialize against each other while operations on
//! unrelated tasks never contend. Readers take a shard read lock just long
//! enough to build an owned [`TaskSnapshot`], which guarantees a consistent
//! view of state + result + error without blocking writers beyond that
//! critical section.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::TaskError;
use crate::task::{Task, TaskSnapshot, TaskState};
use crate::types::{AgentAnalysis, GenerationResult};

/// Default partition count; enough to keep unrelated tasks from contending
/// without a measurable memory cost.
pub const DEFAULT_SHARDS: usize = 16;

type Shard = RwLock<HashMap<Uuid, Task>>;

/// The durable record of every task and the only place task state mutates.
///
/// Cloning is cheap and shares the underlying shards.
#[derive(Debug, Clone)]
pub struct TaskStore {
    shards: Arc<[Shard]>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}

impl TaskStore {
    /// Create a store with `num_shards` partitions (minimum 1).
    pub fn new(num_shards: usize) -> Self {
        let n = num_shards.max(1);
        let shards: Vec<Shard> = (0..n).map(|_| RwLock::new(HashMap::new())).collect();
        Self {
            shards: Arc::from(shards),
        }
    }

    fn shard(&self, task_id: Uuid) -> &Shard {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        task_id.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        &self.shards[idx]
    }

    /// Create a new pending task and return its initial snapshot.
    ///
    /// An empty (or whitespace-only) prompt is rejected synchronously; no
    /// task is created in that case.
    pub async fn create(
        &self,
        prompt: impl Into<String>,
        reference_images: Vec<String>,
    ) -> Result<TaskSnapshot, TaskError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(TaskError::Validation("prompt must not be empty".into()));
        }

        let task_id = Uuid::new_v4();
        let task = Task::new(task_id, prompt, reference_images);
        let snapshot = task.snapshot();
        self.shard(task_id).write().await.insert(task_id, task);
        debug!(%task_id, "task created");
        Ok(snapshot)
    }

    /// Attach the routing decision to a task, at most once.
    ///
    /// Re-attaching a value identical to the one already present is a
    /// no-op; a differing value is rejected. Legal while the task is
    /// pending or processing, illegal once terminal.
    pub async fn attach_analysis(
        &self,
        task_id: Uuid,
        analysis: AgentAnalysis,
    ) -> Result<TaskSnapshot, TaskError> {
        let mut shard = self.shard(task_id).write().await;
        let task = shard
            .get_mut(&task_id)
            .ok_or(TaskError::NotFound { task_id })?;

        if task.state.is_terminal() {
            return Err(TaskError::invalid(
                task_id,
                format!("cannot attach analysis in state {}", task.state.status()),
            ));
        }
        match &task.analysis {
            Some(existing) if *existing == analysis => return Ok(task.snapshot()),
            Some(_) => {
                return Err(TaskError::invalid(
                    task_id,
                    "analysis already attached with a different value",
                ));
            }
            None => {}
        }

        task.analysis = Some(analysis);
        task.updated_at = Utc::now();
        Ok(task.snapshot())
    }

    /// Report progress. Moves a pending task to processing and raises
    /// progress to `max(current, progress)`; out-of-order or duplicate
    /// reports from a racing pipeline are clamped, never regress the value.
    pub async fn advance(&self, task_id: Uuid, progress: u8) -> Result<TaskSnapshot, TaskError> {
        let mut shard = self.shard(task_id).write().await;
        let task = shard
            .get_mut(&task_id)
            .ok_or(TaskError::NotFound { task_id })?;

        let current = match &task.state {
            TaskState::Pending => 0,
            TaskState::Processing { progress } => *progress,
            terminal => {
                return Err(TaskError::invalid(
                    task_id,
                    format!("cannot advance in state {}", terminal.status()),
                ));
            }
        };

        task.state = TaskState::Processing {
            progress: current.max(progress.min(100)),
        };
        task.updated_at = Utc::now();
        Ok(task.snapshot())
    }

    /// Transition to `COMPLETED` with the given result. Terminal.
    ///
    /// The caller (result materializer) must have persisted the asset the
    /// result references before calling this, so no reader ever observes a
    /// completed task with a dangling `asset_id`.
    pub async fn complete(
        &self,
        task_id: Uuid,
        result: GenerationResult,
    ) -> Result<TaskSnapshot, TaskError> {
        let mut shard = self.shard(task_id).write().await;
        let task = shard
            .get_mut(&task_id)
            .ok_or(TaskError::NotFound { task_id })?;

        if task.state.is_terminal() {
            return Err(TaskError::invalid(
                task_id,
                format!("cannot complete in state {}", task.state.status()),
            ));
        }

        task.state = TaskState::Completed { result };
        task.updated_at = Utc::now();
        debug!(%task_id, "task completed");
        Ok(task.snapshot())
    }

    /// Transition to `FAILED` with an error message. Terminal.
    pub async fn fail(
        &self,
        task_id: Uuid,
        error: impl Into<String>,
    ) -> Result<TaskSnapshot, TaskError> {
        let mut shard = self.shard(task_id).write().await;
        let task = shard
            .get_mut(&task_id)
            .ok_or(TaskError::NotFound { task_id })?;

        if task.state.is_terminal() {
            return Err(TaskError::invalid(
                task_id,
                format!("cannot fail in state {}", task.state.status()),
            ));
        }

        task.state = TaskState::Failed {
            progress: task.state.progress(),
            error: error.into(),
        };
        task.updated_at = Utc::now();
        debug!(%task_id, "task failed");
        Ok(task.snapshot())
    }

    /// Snapshot the current state of a task. Pure read: reflects the store
    /// at call time and never waits for in-flight work.
    pub async fn get(&self, task_id: Uuid) -> Result<TaskSnapshot, TaskError> {
        self.shard(task_id)
            .read()
            .await
            .get(&task_id)
            .map(Task::snapshot)
            .ok_or(TaskError::NotFound { task_id })
    }
}
