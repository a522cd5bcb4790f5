//! SQLite implementation of [`AssetStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature. Migrations are run automatically
//! on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary. The database file location is determined at
//! runtime by the `ATELIER_DATABASE_URL` environment variable and is **not**
//! related to the current working directory at runtime.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use std::str::FromStr;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use atelier_core::ContentType;

use super::{AssetRecord, AssetStore, GalleryFilter, GalleryMeta, GalleryRecord, Page};

/// SQLite-backed asset & gallery store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://atelier.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database for tests.
    ///
    /// Pinned to a single pooled connection: every new connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    #[cfg(test)]
    pub(crate) async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

type AssetRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    String,
);

fn asset_from_row(
    (asset_id, content_type, url, thumbnail_url, prompt, model, is_published, created_at): AssetRow,
) -> AssetRecord {
    AssetRecord {
        content_type: parse_content_type(&asset_id, &content_type),
        created_at: parse_timestamp(&asset_id, &created_at),
        asset_id,
        url,
        thumbnail_url,
        prompt,
        model,
        is_published: is_published != 0,
    }
}

fn parse_content_type(asset_id: &str, raw: &str) -> ContentType {
    ContentType::from_str(raw).unwrap_or_else(|_| {
        tracing::warn!(%asset_id, %raw, "unknown content_type in assets table; using IMAGE");
        ContentType::Image
    })
}

fn parse_timestamp(asset_id: &str, raw: &str) -> chrono::DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(%asset_id, %raw, error = %e, "failed to parse asset timestamp; using now");
        Utc::now()
    })
}

impl AssetStore for SqliteStore {
    async fn insert_asset(&self, record: AssetRecord) -> Result<(), sqlx::Error> {
        let created_at = record.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO assets (asset_id, content_type, url, thumbnail_url, prompt, model, is_published, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&record.asset_id)
        .bind(record.content_type.to_string())
        .bind(&record.url)
        .bind(&record.thumbnail_url)
        .bind(&record.prompt)
        .bind(&record.model)
        .bind(i64::from(record.is_published))
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Option<AssetRecord>, sqlx::Error> {
        let row: Option<AssetRow> = sqlx::query_as(
            "SELECT asset_id, content_type, url, thumbnail_url, prompt, model, is_published, created_at \
             FROM assets WHERE asset_id = ?1",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(asset_from_row))
    }

    async fn list_assets(
        &self,
        content_type: Option<ContentType>,
        page: Page,
    ) -> Result<(Vec<AssetRecord>, u64), sqlx::Error> {
        let (rows, total): (Vec<AssetRow>, i64) = if let Some(ct) = content_type {
            let ct = ct.to_string();
            let rows = sqlx::query_as(
                "SELECT asset_id, content_type, url, thumbnail_url, prompt, model, is_published, created_at \
                 FROM assets WHERE content_type = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
            )
            .bind(&ct)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
            let total =
                sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE content_type = ?1")
                    .bind(&ct)
                    .fetch_one(&self.pool)
                    .await?;
            (rows, total)
        } else {
            let rows = sqlx::query_as(
                "SELECT asset_id, content_type, url, thumbnail_url, prompt, model, is_published, created_at \
                 FROM assets ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
            )
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
            let total = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        };

        Ok((
            rows.into_iter().map(asset_from_row).collect(),
            total.max(0) as u64,
        ))
    }

    async fn publish_asset(&self, asset_id: &str, meta: &GalleryMeta) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE assets SET is_published = 1 WHERE asset_id = ?1")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            // Unknown asset; nothing to roll back.
            return Ok(false);
        }

        // Upsert: a repeated publish refreshes the display metadata instead
        // of duplicating the gallery entry. like_count and published_at are
        // kept from the first publish.
        let published_at = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO gallery_items (asset_id, title, author, category, like_count, published_at) \
             VALUES (?1, ?2, ?3, ?4, 0, ?5) \
             ON CONFLICT(asset_id) DO UPDATE SET \
             title = excluded.title, author = excluded.author, category = excluded.category",
        )
        .bind(asset_id)
        .bind(&meta.title)
        .bind(&meta.author)
        .bind(&meta.category)
        .bind(&published_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<bool, sqlx::Error> {
        // Cascade policy: the gallery entry is display metadata over the
        // asset, so it goes away with the asset, in one transaction.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM gallery_items WHERE asset_id = ?1")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM assets WHERE asset_id = ?1")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn list_gallery(
        &self,
        filter: &GalleryFilter,
        page: Page,
    ) -> Result<(Vec<GalleryRecord>, u64), sqlx::Error> {
        type GalleryRow = (
            String,
            String,
            String,
            Option<String>,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            i64,
        );

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT a.asset_id, a.content_type, a.url, a.thumbnail_url, a.prompt, a.model, \
             a.created_at, g.title, g.author, g.category, g.like_count \
             FROM gallery_items g JOIN assets a ON a.asset_id = g.asset_id",
        );
        push_gallery_filters(&mut query, filter);
        query.push(" ORDER BY a.created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());
        let rows: Vec<GalleryRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut count: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) FROM gallery_items g JOIN assets a ON a.asset_id = g.asset_id",
        );
        push_gallery_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let records = rows
            .into_iter()
            .map(
                |(
                    asset_id,
                    content_type,
                    url,
                    thumbnail_url,
                    prompt,
                    model,
                    created_at,
                    title,
                    author,
                    category,
                    like_count,
                )| GalleryRecord {
                    content_type: parse_content_type(&asset_id, &content_type),
                    created_at: parse_timestamp(&asset_id, &created_at),
                    asset_id,
                    url,
                    thumbnail_url,
                    prompt,
                    model,
                    title,
                    author,
                    category,
                    like_count,
                },
            )
            .collect();
        Ok((records, total.max(0) as u64))
    }
}

fn push_gallery_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &GalleryFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(ct) = filter.content_type {
        query.push(" AND a.content_type = ");
        query.push_bind(ct.to_string());
    }
    if let Some(category) = &filter.category {
        query.push(" AND g.category = ");
        query.push_bind(category.clone());
    }
    if let Some(keyword) = &filter.keyword {
        // The keyword is a literal substring; escape LIKE wildcards.
        let escaped = keyword
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        query.push(" AND (LOWER(a.prompt) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" ESCAPE '\\' OR LOWER(COALESCE(g.title, '')) LIKE ");
        query.push_bind(pattern);
        query.push(" ESCAPE '\\')");
    }
}
