use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use atelier_core::ContentType;

use crate::db::{AssetRecord, GalleryMeta, GalleryRecord};

/// One durable generated artifact, as returned by the asset read paths.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: String,
    pub content_type: ContentType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    pub is_published: bool,
    pub created_at: String,
}

impl From<AssetRecord> for AssetResponse {
    fn from(r: AssetRecord) -> Self {
        Self {
            id: r.asset_id,
            content_type: r.content_type,
            url: r.url,
            thumbnail_url: r.thumbnail_url,
            prompt: r.prompt,
            model: r.model,
            is_published: r.is_published,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// A published asset with its gallery display metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemResponse {
    pub asset_id: String,
    pub content_type: ContentType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub like_count: i64,
    pub created_at: String,
}

impl From<GalleryRecord> for GalleryItemResponse {
    fn from(r: GalleryRecord) -> Self {
        Self {
            asset_id: r.asset_id,
            content_type: r.content_type,
            url: r.url,
            thumbnail_url: r.thumbnail_url,
            prompt: r.prompt,
            model: r.model,
            title: r.title,
            author: r.author,
            category: r.category,
            like_count: r.like_count,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Body of `POST /gallery/save`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveGalleryRequest {
    pub asset_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl SaveGalleryRequest {
    pub fn meta(&self) -> GalleryMeta {
        GalleryMeta {
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
        }
    }
}
