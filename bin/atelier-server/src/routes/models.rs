//! Model catalog endpoint.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router, extract::State};
use utoipa::OpenApi;

use atelier_core::ModelInfo;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_models), components(schemas(ModelInfo)))]
pub struct ModelsApi;

/// Register model catalog routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models", get(list_models))
}

/// The full catalog, including models that are currently unavailable;
/// clients use `available` to grey entries out.
#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    responses(
        (status = 200, description = "Model catalog", body = Vec<ModelInfo>)
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<Vec<ModelInfo>> {
    Json(state.agent.models().to_vec())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
