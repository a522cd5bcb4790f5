//! Asset read paths: list, fetch, delete.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use utoipa::OpenApi;

use crate::db::{AssetStore, Page};
use crate::error::ServerError;
use crate::routes::parse_content_type;
use crate::schemas::assets::AssetResponse;
use crate::schemas::common::PageResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_assets, get_asset, delete_asset),
    components(schemas(AssetResponse))
)]
pub struct AssetsApi;

/// Register asset routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets/{id}", get(get_asset).delete(delete_asset))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListQuery {
    pub current: Option<u32>,
    pub size: Option<u32>,
    pub content_type: Option<String>,
}

impl AssetListQuery {
    fn page(&self) -> Page {
        Page::new(self.current.unwrap_or(1), self.size.unwrap_or(10))
    }
}

// ── Asset handlers ────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    responses(
        (status = 200, description = "Assets, newest first", body = PageResponse<AssetResponse>),
        (status = 400, description = "Unknown contentType filter"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AssetListQuery>,
) -> Result<Json<PageResponse<AssetResponse>>, ServerError> {
    let content_type = parse_content_type(q.content_type.as_deref())?;
    let page = q.page();
    let (records, total) = state.assets.list_assets(content_type, page).await?;
    Ok(Json(PageResponse::new(
        records.into_iter().map(AssetResponse::from).collect(),
        page,
        total,
    )))
}

#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    responses(
        (status = 200, description = "Asset detail", body = AssetResponse),
        (status = 404, description = "Unknown asset id"),
    )
)]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AssetResponse>, ServerError> {
    let record = state
        .assets
        .get_asset(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("asset {id} not found")))?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    responses(
        (status = 200, description = "Asset deleted", body = serde_json::Value),
        (status = 404, description = "Unknown asset id"),
    )
)]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.assets.delete_asset(&id).await? {
        return Err(ServerError::NotFound(format!("asset {id} not found")));
    }
    info!(asset_id = %id, "asset deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use atelier_core::ContentType;

    use super::*;
    use crate::db::{AssetRecord, GalleryFilter, GalleryMeta, Page};
    use crate::state::test_state;

    fn asset(n: usize, content_type: ContentType) -> AssetRecord {
        AssetRecord {
            asset_id: format!("asset-{n}"),
            content_type,
            url: format!("https://assets.test/{n}.png"),
            thumbnail_url: None,
            prompt: format!("prompt {n}"),
            model: "nano-banana".to_owned(),
            is_published: false,
            // Distinct timestamps so newest-first ordering is deterministic.
            created_at: Utc::now() + Duration::milliseconds(n as i64),
        }
    }

    fn list_query(current: u32, size: u32, content_type: Option<&str>) -> AssetListQuery {
        AssetListQuery {
            current: Some(current),
            size: Some(size),
            content_type: content_type.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn pagination_returns_page_and_total() {
        let state = test_state().await;
        for n in 0..25 {
            state.assets.insert_asset(asset(n, ContentType::Image)).await.unwrap();
        }

        let Json(page1) = list_assets(State(state.clone()), Query(list_query(1, 10, None)))
            .await
            .unwrap();
        assert_eq!(page1.records.len(), 10);
        assert_eq!(page1.total, 25);
        // Newest first.
        assert_eq!(page1.records[0].id, "asset-24");

        let Json(page3) = list_assets(State(state), Query(list_query(3, 10, None)))
            .await
            .unwrap();
        assert_eq!(page3.records.len(), 5);
        assert_eq!(page3.total, 25);
    }

    #[tokio::test]
    async fn oversized_page_size_is_clamped() {
        let state = test_state().await;
        for n in 0..3 {
            state.assets.insert_asset(asset(n, ContentType::Image)).await.unwrap();
        }

        let Json(page) = list_assets(State(state), Query(list_query(1, 500, None)))
            .await
            .unwrap();
        assert_eq!(page.size, 100, "requested size is clamped to the cap");
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn content_type_filter_is_case_insensitive() {
        let state = test_state().await;
        state.assets.insert_asset(asset(0, ContentType::Image)).await.unwrap();
        state.assets.insert_asset(asset(1, ContentType::Video)).await.unwrap();

        let Json(videos) = list_assets(
            State(state.clone()),
            Query(list_query(1, 10, Some("video"))),
        )
        .await
        .unwrap();
        assert_eq!(videos.total, 1);
        assert_eq!(videos.records[0].content_type, ContentType::Video);

        let err = list_assets(State(state), Query(list_query(1, 10, Some("gif"))))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn get_unknown_asset_is_not_found() {
        let state = test_state().await;
        let err = get_asset(State(state), Path("nope".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_gallery_entry() {
        let state = test_state().await;
        state.assets.insert_asset(asset(0, ContentType::Image)).await.unwrap();
        state
            .assets
            .publish_asset("asset-0", &GalleryMeta::default())
            .await
            .unwrap();

        let Json(body) = delete_asset(State(state.clone()), Path("asset-0".to_owned()))
            .await
            .unwrap();
        assert_eq!(body["deleted"], true);

        let (gallery, total) = state
            .assets
            .list_gallery(&GalleryFilter::default(), Page::new(1, 10))
            .await
            .unwrap();
        assert!(gallery.is_empty());
        assert_eq!(total, 0);

        // Second delete: the asset is already gone.
        let err = delete_asset(State(state), Path("asset-0".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }
}
