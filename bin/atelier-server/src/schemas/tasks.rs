use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use atelier_core::{AgentAnalysis, TaskStatus};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Free-form description of what to generate.
    #[validate(length(min = 1, max = 2000, message = "prompt must be 1..=2000 characters"))]
    pub prompt: String,

    /// Optional reference media URLs; their presence switches the routing
    /// intent to the image-to-* scenes.
    #[serde(default)]
    pub reference_images: Vec<String>,
}

/// Body of the `201 Created` response for `POST /tasks`.
///
/// `analysis` and `estimated_time` are present when routing succeeded; a
/// task whose routing failed is created directly in `FAILED` with the
/// reason in `error_message`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    #[serde(rename = "agentAnalysis", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AgentAnalysis>,
    /// Rough completion estimate in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
