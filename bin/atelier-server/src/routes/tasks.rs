//! Task lifecycle endpoints: creation and polling.
//!
//! `POST /tasks` accepts the request and returns immediately; generation
//! runs in the background and clients observe progress by polling
//! `GET /tasks/{taskId}`. A request the routing agent cannot serve still
//! creates a task, born directly in `FAILED`, so clients have one uniform
//! way to learn about failures.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;
use utoipa::OpenApi;
use uuid::Uuid;
use validator::Validate;

use atelier_core::{AgentAnalysis, ContentType, GenerationResult, TaskSnapshot, TaskStatus};

use crate::agent::RoutingAgent;
use crate::error::ServerError;
use crate::pipeline::{self, GenerationRequest};
use crate::schemas::tasks::{CreateTaskRequest, CreateTaskResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(create_task, get_task),
    components(schemas(
        CreateTaskRequest,
        CreateTaskResponse,
        TaskSnapshot,
        TaskStatus,
        AgentAnalysis,
        GenerationResult,
        ContentType
    ))
)]
pub struct TasksApi;

/// Register task routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", get(get_task))
}

// ── Task handlers ─────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task accepted", body = CreateTaskResponse),
        (status = 400, description = "Invalid prompt"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let snapshot = state
        .tasks
        .create(req.prompt.clone(), req.reference_images.clone())
        .await?;
    let task_id = snapshot.task_id;

    match state
        .agent
        .analyze(&req.prompt, !req.reference_images.is_empty())
    {
        Ok(analysis) => {
            state.tasks.attach_analysis(task_id, analysis.clone()).await?;
            let estimated_time = RoutingAgent::estimate_seconds(analysis.content_type);
            pipeline::spawn_generation(
                state.clone(),
                GenerationRequest {
                    task_id,
                    prompt: req.prompt,
                    reference_images: req.reference_images,
                    analysis: analysis.clone(),
                },
            );
            Ok((
                StatusCode::CREATED,
                Json(CreateTaskResponse {
                    task_id,
                    status: TaskStatus::Pending,
                    analysis: Some(analysis),
                    estimated_time: Some(estimated_time),
                    error_message: None,
                }),
            ))
        }
        Err(e) => {
            // The task record is the failure channel; the request itself
            // still succeeds with 201.
            warn!(%task_id, error = %e, "routing failed");
            let failed = state.tasks.fail(task_id, e.to_string()).await?;
            Ok((
                StatusCode::CREATED,
                Json(CreateTaskResponse {
                    task_id,
                    status: failed.status,
                    analysis: None,
                    estimated_time: None,
                    error_message: failed.error_message,
                }),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    responses(
        (status = 200, description = "Current task snapshot", body = TaskSnapshot),
        (status = 404, description = "Unknown task id"),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskSnapshot>, ServerError> {
    Ok(Json(state.tasks.get(id).await?))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::sync::watch;

    use atelier_core::{PollOutcome, TaskError, poll_until_terminal};

    use super::*;
    use crate::db::{AssetStore, GalleryFilter, Page};
    use crate::state::test_state;

    fn request(prompt: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            prompt: prompt.to_owned(),
            reference_images: vec![],
        }
    }

    async fn wait_terminal(state: &Arc<AppState>, task_id: Uuid) -> TaskSnapshot {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let tasks = state.tasks.clone();
        let outcome = poll_until_terminal(
            move || {
                let tasks = tasks.clone();
                async move { tasks.get(task_id).await }
            },
            Duration::from_millis(10),
            cancel_rx,
        )
        .await
        .expect("polling failed");
        match outcome {
            PollOutcome::Terminal(snapshot) => snapshot,
            PollOutcome::Cancelled => panic!("poll cancelled"),
        }
    }

    #[tokio::test]
    async fn create_then_poll_reaches_completed_with_asset() {
        let state = test_state().await;
        let (status, Json(created)) =
            create_task(State(state.clone()), Json(request("a cat astronaut")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            created.analysis.as_ref().unwrap().selected_model,
            "nano-banana"
        );
        assert_eq!(created.estimated_time, Some(30));

        let snapshot = wait_terminal(&state, created.task_id).await;
        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(snapshot.progress, 100);
        let result = snapshot.result.expect("completed task carries a result");

        // The asset was materialized before completion and is unpublished.
        let asset = state
            .assets
            .get_asset(&result.asset_id)
            .await
            .unwrap()
            .expect("asset exists");
        assert!(!asset.is_published);
        assert_eq!(asset.prompt, "a cat astronaut");
        assert_eq!(asset.model, "nano-banana");

        // Nothing reaches the gallery without an explicit publish.
        let (gallery, total) = state
            .assets
            .list_gallery(&GalleryFilter::default(), Page::new(1, 10))
            .await
            .unwrap();
        assert!(gallery.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn unroutable_prompt_creates_failed_task() {
        let state = test_state().await;
        let (status, Json(created)) = create_task(
            State(state.clone()),
            Json(request("a calm piano music track")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.status, TaskStatus::Failed);
        assert!(created.analysis.is_none());
        assert!(created.error_message.is_some());

        let snapshot = state.tasks.get(created.task_id).await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Failed);
        assert!(snapshot.result.is_none());
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let state = test_state().await;
        let err = create_task(State(state.clone()), Json(request("")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));

        // Whitespace passes the length check but is rejected by the store.
        let err = create_task(State(state), Json(request("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Task(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_task_id_is_not_found() {
        let state = test_state().await;
        let err = get_task(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Task(TaskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn reference_images_switch_intent_scene() {
        let state = test_state().await;
        let req = CreateTaskRequest {
            prompt: "make this watercolor".to_owned(),
            reference_images: vec!["https://example.com/ref.png".to_owned()],
        };
        let (_, Json(created)) = create_task(State(state), Json(req)).await.unwrap();
        assert_eq!(created.analysis.unwrap().intent, "image_to_image");
    }
}
