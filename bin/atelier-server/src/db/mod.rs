//! Asset & gallery persistence layer.
//!
//! [`AssetStore`] defines the interface for the durable artifact records the
//! result materializer produces. The default implementation is
//! [`sqlite::SqliteStore`]. To swap to another database, implement
//! [`AssetStore`] for your new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};

use atelier_core::ContentType;

/// A row in the `assets` table: one durable generated artifact.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub asset_id: String,
    pub content_type: ContentType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// An asset joined with its gallery display metadata.
///
/// Exists only for assets explicitly published to the public gallery;
/// publishing links the asset, it does not move or consume it.
#[derive(Debug, Clone)]
pub struct GalleryRecord {
    pub asset_id: String,
    pub content_type: ContentType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub like_count: i64,
}

/// Display metadata supplied when publishing an asset to the gallery.
#[derive(Debug, Clone, Default)]
pub struct GalleryMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

/// Gallery listing filters; all optional and combinable.
#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    pub content_type: Option<ContentType>,
    pub category: Option<String>,
    /// Case-insensitive substring match against prompt and title.
    pub keyword: Option<String>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub current: u32,
    pub size: u32,
}

impl Page {
    pub fn new(current: u32, size: u32) -> Self {
        Self {
            current: current.max(1),
            size: size.clamp(1, 100),
        }
    }

    pub fn limit(self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(self) -> i64 {
        i64::from(self.current - 1) * i64::from(self.size)
    }
}

/// Interface for persisting and browsing generated assets.
pub trait AssetStore: Send + Sync + 'static {
    /// Insert a freshly materialized asset (`is_published = false`).
    fn insert_asset(
        &self,
        record: AssetRecord,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    fn get_asset(
        &self,
        asset_id: &str,
    ) -> impl Future<Output = Result<Option<AssetRecord>, sqlx::Error>> + Send;

    /// Assets ordered by creation time, newest first. Returns the page plus
    /// the total row count for the filter.
    fn list_assets(
        &self,
        content_type: Option<ContentType>,
        page: Page,
    ) -> impl Future<Output = Result<(Vec<AssetRecord>, u64), sqlx::Error>> + Send;

    /// Publish an asset to the gallery. Idempotent: a second call updates
    /// the display metadata instead of duplicating the gallery entry.
    /// Returns `false` if the asset does not exist.
    fn publish_asset(
        &self,
        asset_id: &str,
        meta: &GalleryMeta,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Delete an asset. Cascades to its gallery entry in the same
    /// transaction so no orphaned gallery row can survive. Returns `false`
    /// if the asset does not exist.
    fn delete_asset(
        &self,
        asset_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Published gallery entries, newest first, with optional filters.
    fn list_gallery(
        &self,
        filter: &GalleryFilter,
        page: Page,
    ) -> impl Future<Output = Result<(Vec<GalleryRecord>, u64), sqlx::Error>> + Send;
}

// ── Tests ──────────────────────────────────────────────────────────────────────
