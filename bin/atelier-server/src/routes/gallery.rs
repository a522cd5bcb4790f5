//! Public gallery: browse published assets and publish new ones.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use utoipa::OpenApi;

use crate::db::{AssetStore, GalleryFilter, Page};
use crate::error::ServerError;
use crate::routes::parse_content_type;
use crate::schemas::assets::{GalleryItemResponse, SaveGalleryRequest};
use crate::schemas::common::PageResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_gallery, save_to_gallery),
    components(schemas(GalleryItemResponse, SaveGalleryRequest))
)]
pub struct GalleryApi;

/// Register gallery routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gallery", get(list_gallery))
        .route("/gallery/save", post(save_to_gallery))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryListQuery {
    pub current: Option<u32>,
    pub size: Option<u32>,
    pub content_type: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
}

// ── Gallery handlers ──────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/gallery",
    tag = "gallery",
    responses(
        (status = 200, description = "Published items, newest first", body = PageResponse<GalleryItemResponse>),
        (status = 400, description = "Unknown contentType filter"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_gallery(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GalleryListQuery>,
) -> Result<Json<PageResponse<GalleryItemResponse>>, ServerError> {
    let filter = GalleryFilter {
        content_type: parse_content_type(q.content_type.as_deref())?,
        category: q.category,
        keyword: q.keyword,
    };
    let page = Page::new(q.current.unwrap_or(1), q.size.unwrap_or(10));
    let (records, total) = state.assets.list_gallery(&filter, page).await?;
    Ok(Json(PageResponse::new(
        records.into_iter().map(GalleryItemResponse::from).collect(),
        page,
        total,
    )))
}

#[utoipa::path(
    post,
    path = "/gallery/save",
    tag = "gallery",
    request_body = SaveGalleryRequest,
    responses(
        (status = 200, description = "Asset published", body = serde_json::Value),
        (status = 404, description = "Unknown asset id"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn save_to_gallery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveGalleryRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let published = state
        .assets
        .publish_asset(&req.asset_id, &req.meta())
        .await?;
    if !published {
        return Err(ServerError::NotFound(format!(
            "asset {} not found",
            req.asset_id
        )));
    }
    info!(asset_id = %req.asset_id, "asset published to gallery");
    Ok(Json(serde_json::json!({ "published": true })))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use atelier_core::ContentType;

    use super::*;
    use crate::db::AssetRecord;
    use crate::state::test_state;

    fn asset(n: usize, prompt: &str, content_type: ContentType) -> AssetRecord {
        AssetRecord {
            asset_id: format!("asset-{n}"),
            content_type,
            url: format!("https://assets.test/{n}.png"),
            thumbnail_url: None,
            prompt: prompt.to_owned(),
            model: "nano-banana".to_owned(),
            is_published: false,
            created_at: Utc::now() + Duration::milliseconds(n as i64),
        }
    }

    fn save_request(asset_id: &str, title: Option<&str>) -> SaveGalleryRequest {
        SaveGalleryRequest {
            asset_id: asset_id.to_owned(),
            title: title.map(str::to_owned),
            author: None,
            category: Some("art".to_owned()),
        }
    }

    fn list_query(keyword: Option<&str>) -> GalleryListQuery {
        GalleryListQuery {
            current: Some(1),
            size: Some(10),
            content_type: None,
            category: None,
            keyword: keyword.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn publish_is_idempotent_and_updates_metadata() {
        let state = test_state().await;
        state
            .assets
            .insert_asset(asset(0, "a cat astronaut", ContentType::Image))
            .await
            .unwrap();

        save_to_gallery(State(state.clone()), Json(save_request("asset-0", Some("Cat"))))
            .await
            .unwrap();
        save_to_gallery(
            State(state.clone()),
            Json(save_request("asset-0", Some("Space Cat"))),
        )
        .await
        .unwrap();

        let Json(page) = list_gallery(State(state.clone()), Query(list_query(None)))
            .await
            .unwrap();
        assert_eq!(page.total, 1, "second publish must not duplicate");
        assert_eq!(page.records[0].title.as_deref(), Some("Space Cat"));
        assert_eq!(page.records[0].like_count, 0);

        let record = state.assets.get_asset("asset-0").await.unwrap().unwrap();
        assert!(record.is_published);
    }

    #[tokio::test]
    async fn publish_unknown_asset_is_not_found() {
        let state = test_state().await;
        let err = save_to_gallery(State(state), Json(save_request("nope", None)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn keyword_matches_prompt_and_title_case_insensitively() {
        let state = test_state().await;
        state
            .assets
            .insert_asset(asset(0, "a red dragon", ContentType::Image))
            .await
            .unwrap();
        state
            .assets
            .insert_asset(asset(1, "ocean waves", ContentType::Image))
            .await
            .unwrap();
        save_to_gallery(
            State(state.clone()),
            Json(save_request("asset-0", Some("Fire Lizard"))),
        )
        .await
        .unwrap();
        save_to_gallery(State(state.clone()), Json(save_request("asset-1", None)))
            .await
            .unwrap();

        let Json(by_prompt) = list_gallery(State(state.clone()), Query(list_query(Some("DRAGON"))))
            .await
            .unwrap();
        assert_eq!(by_prompt.total, 1);
        assert_eq!(by_prompt.records[0].asset_id, "asset-0");

        let Json(by_title) = list_gallery(State(state.clone()), Query(list_query(Some("lizard"))))
            .await
            .unwrap();
        assert_eq!(by_title.total, 1);

        let Json(none) = list_gallery(State(state), Query(list_query(Some("unicorn"))))
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn keyword_wildcards_match_literally() {
        let state = test_state().await;
        state
            .assets
            .insert_asset(asset(0, "100% cotton shirt", ContentType::Image))
            .await
            .unwrap();
        state
            .assets
            .insert_asset(asset(1, "100x cotton shirt", ContentType::Image))
            .await
            .unwrap();
        save_to_gallery(State(state.clone()), Json(save_request("asset-0", None)))
            .await
            .unwrap();
        save_to_gallery(State(state.clone()), Json(save_request("asset-1", None)))
            .await
            .unwrap();

        // '%' in the keyword is a literal character, not a LIKE wildcard.
        let Json(page) = list_gallery(State(state.clone()), Query(list_query(Some("100%"))))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].asset_id, "asset-0");

        // Same for '_': it must not match arbitrary single characters.
        let Json(page) = list_gallery(State(state), Query(list_query(Some("100_"))))
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn pagination_over_published_items() {
        let state = test_state().await;
        for n in 0..25 {
            state
                .assets
                .insert_asset(asset(n, "landscape", ContentType::Image))
                .await
                .unwrap();
            save_to_gallery(
                State(state.clone()),
                Json(save_request(&format!("asset-{n}"), None)),
            )
            .await
            .unwrap();
        }

        let q = |current| GalleryListQuery {
            current: Some(current),
            size: Some(10),
            content_type: None,
            category: None,
            keyword: None,
        };
        let Json(page1) = list_gallery(State(state.clone()), Query(q(1))).await.unwrap();
        assert_eq!(page1.records.len(), 10);
        assert_eq!(page1.total, 25);

        let Json(page3) = list_gallery(State(state), Query(q(3))).await.unwrap();
        assert_eq!(page3.records.len(), 5);
        assert_eq!(page3.total, 25);
    }
}
