//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `ATELIER_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - Task lifecycle, asset, gallery, and model catalog routes

pub mod assets;
pub mod doc;
pub mod gallery;
pub mod health;
pub mod models;
pub mod tasks;

use std::sync::Arc;

use axum::{Router, middleware};
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Parse an optional `contentType` query value, case-insensitively.
pub(crate) fn parse_content_type(
    raw: Option<&str>,
) -> Result<Option<atelier_core::ContentType>, ServerError> {
    raw.map(|s| {
        s.parse().map_err(|_| {
            ServerError::BadRequest(format!(
                "unknown contentType '{s}' (expected IMAGE, VIDEO or AUDIO)"
            ))
        })
    })
    .transpose()
}

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(tasks::router())
        .merge(assets::router())
        .merge(gallery::router())
        .merge(models::router());

    // Enabled by default; disable with ATELIER_ENABLE_SWAGGER=false in
    // production to avoid exposing the API structure.
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app.layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
