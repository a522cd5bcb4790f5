//! atelier-core – the asynchronous generation task lifecycle.
//!
//! This crate owns everything with real invariants in the atelier service:
//! the task data model, the lifecycle state machine, the sharded in-memory
//! [`TaskStore`] that serializes writes per task, and the client-side
//! polling helper. Generation itself happens elsewhere (the server's
//! pipeline drives the store through `advance`/`complete`/`fail`); this
//! crate only tracks metadata about it.
//!
//! # Quick-start
//!
//! ```rust,no_run
//! use atelier_core::{ContentType, GenerationResult, TaskStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), atelier_core::TaskError> {
//! let store = TaskStore::new(16);
//! let task = store.create("a cat astronaut", Vec::new()).await?;
//!
//! store.advance(task.task_id, 50).await?;
//! store
//!     .complete(task.task_id, GenerationResult {
//!         asset_id: "a1".into(),
//!         content_type: ContentType::Image,
//!         url: "https://assets.local/a1.png".into(),
//!         thumbnail_url: None,
//!         prompt: "a cat astronaut, detailed".into(),
//!         model: "m1".into(),
//!         metadata: None,
//!     })
//!     .await?;
//!
//! let snapshot = store.get(task.task_id).await?;
//! assert!(snapshot.status.is_terminal());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod poll;
pub mod store;
pub mod task;
pub mod types;


pub use error::TaskError;
pub use poll::{PollOutcome, poll_until_terminal};
pub use store::TaskStore;
pub use task::{TaskSnapshot, TaskState, TaskStatus};
pub use types::{AgentAnalysis, ContentType, GenerationOutput, GenerationResult, ModelInfo};
