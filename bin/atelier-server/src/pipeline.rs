//! Generation pipeline: drives a created task to its terminal state.
//!
//! For each task the pipeline reports progress, calls the generation
//! provider, materializes the output as a durable asset, and only then
//! completes the task. A completed task therefore never references an asset
//! that does not exist. Any error on the way fails the task instead;
//! failures are captured in the task record, never surfaced to polling
//! clients as transport errors.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use atelier_core::{AgentAnalysis, ContentType, GenerationOutput};

use crate::db::{AssetRecord, AssetStore};
use crate::state::AppState;

/// Everything a provider needs to produce one artifact.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub task_id: Uuid,
    /// The user's original prompt, kept for the asset record.
    pub prompt: String,
    pub reference_images: Vec<String>,
    /// The routing decision; `optimized_prompt` is what generation consumes.
    pub analysis: AgentAnalysis,
}

/// A generation backend for one or more content types.
///
/// Object-safe so backends can be swapped per deployment (and mocked in
/// tests) behind `Arc<dyn GenerationProvider>`.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationOutput>;
}

/// Deterministic placeholder provider.
///
/// Produces stable URLs under a configured base so the whole lifecycle is
/// exercisable end to end without a real model backend.
#[derive(Debug, Clone)]
pub struct MockProvider {
    base_url: String,
    latency: Duration,
}

impl MockProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            latency: Duration::ZERO,
        }
    }

    /// Simulate generation time; useful when running the server for real.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationOutput> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let content_type = request.analysis.content_type;
        let (kind, ext) = match content_type {
            ContentType::Image => ("image", "png"),
            ContentType::Video => ("video", "mp4"),
            ContentType::Audio => ("audio", "wav"),
        };
        let url = format!("{}/{kind}/{}.{ext}", self.base_url, request.task_id);
        let thumbnail_url = match content_type {
            ContentType::Audio => None,
            _ => Some(format!("{}/{kind}/{}_thumb.jpg", self.base_url, request.task_id)),
        };

        let mut metadata = serde_json::Map::new();
        match content_type {
            ContentType::Image => {
                metadata.insert("width".into(), 1024.into());
                metadata.insert("height".into(), 1024.into());
                metadata.insert("format".into(), "png".into());
            }
            ContentType::Video => {
                metadata.insert("duration".into(), 8.into());
                metadata.insert("fps".into(), 24.into());
                metadata.insert("resolution".into(), "720p".into());
            }
            ContentType::Audio => {
                metadata.insert("duration".into(), 30.into());
                metadata.insert("sampleRate".into(), 44100.into());
            }
        }

        Ok(GenerationOutput {
            content_type,
            url,
            thumbnail_url,
            prompt: request.analysis.optimized_prompt.clone(),
            model: request.analysis.selected_model.clone(),
            metadata: Some(metadata),
        })
    }
}

/// Fire-and-forget execution of the generation pipeline for one task.
///
/// Any error fails the task; a failure to record the failure is only logged
/// (the task may have raced to terminal already).
pub fn spawn_generation(state: Arc<AppState>, request: GenerationRequest) {
    tokio::spawn(async move {
        let task_id = request.task_id;
        if let Err(e) = run_generation(&state, request).await {
            warn!(%task_id, error = %e, "generation pipeline failed");
            if let Err(fail_err) = state.tasks.fail(task_id, e.to_string()).await {
                warn!(%task_id, error = %fail_err, "could not mark task failed");
            }
        }
    });
}

async fn run_generation(state: &AppState, request: GenerationRequest) -> anyhow::Result<()> {
    let task_id = request.task_id;

    state.tasks.advance(task_id, 10).await?;
    let output = state
        .provider
        .generate(&request)
        .await
        .context("generation provider failed")?;
    state.tasks.advance(task_id, 90).await?;

    // Materialization and completion are one logical unit: the asset row
    // must exist before any reader can observe the task as completed.
    let asset_id = Uuid::new_v4().to_string();
    state
        .assets
        .insert_asset(AssetRecord {
            asset_id: asset_id.clone(),
            content_type: output.content_type,
            url: output.url.clone(),
            thumbnail_url: output.thumbnail_url.clone(),
            prompt: request.prompt.clone(),
            model: output.model.clone(),
            is_published: false,
            created_at: Utc::now(),
        })
        .await
        .context("failed to persist asset")?;

    let result = output.into_result(&asset_id);
    if let Err(e) = state.tasks.complete(task_id, result).await {
        // The task reached a terminal state underneath us; take the now
        // unreachable asset back out so nothing dangles.
        warn!(%task_id, %asset_id, error = %e, "completion rejected; removing orphaned asset");
        if let Err(del_err) = state.assets.delete_asset(&asset_id).await {
            warn!(%asset_id, error = %del_err, "failed to remove orphaned asset");
        }
        return Err(e.into());
    }

    info!(%task_id, %asset_id, "generation task completed");
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use atelier_core::{TaskStatus, TaskStore};

    use super::*;
    use crate::agent::RoutingAgent;
    use crate::config::Config;
    use crate::db::sqlite::SqliteStore;
    use crate::db::Page;

    async fn state_with(provider: Arc<dyn GenerationProvider>) -> Arc<AppState> {
        let config = Config {
            bind_address: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            log_level: "info".into(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: false,
            task_shards: 4,
            asset_base_url: "https://assets.test".into(),
        };
        Arc::new(AppState {
            config: Arc::new(config),
            tasks: TaskStore::new(4),
            assets: SqliteStore::connect_in_memory().await.expect("sqlite"),
            agent: RoutingAgent::default(),
            provider,
        })
    }

    fn analysis_for(state: &AppState, prompt: &str) -> AgentAnalysis {
        state.agent.analyze(prompt, false).expect("routable prompt")
    }

    #[tokio::test]
    async fn mock_provider_output_matches_content_type() {
        let provider = MockProvider::new("https://assets.test");
        let state = state_with(Arc::new(provider.clone())).await;

        let image_request = GenerationRequest {
            task_id: Uuid::new_v4(),
            prompt: "a cat".into(),
            reference_images: vec![],
            analysis: analysis_for(&state, "a cat"),
        };
        let image = provider.generate(&image_request).await.unwrap();
        assert!(image.url.ends_with(".png"));
        assert!(image.thumbnail_url.is_some());
        assert!(image.prompt.contains("a cat"));

        let video_request = GenerationRequest {
            task_id: Uuid::new_v4(),
            prompt: "a video of waves".into(),
            reference_images: vec![],
            analysis: analysis_for(&state, "a video of waves"),
        };
        let video = provider.generate(&video_request).await.unwrap();
        assert!(video.url.ends_with(".mp4"));
        assert_eq!(video.model, "sora-2");
    }

    #[tokio::test]
    async fn task_failed_mid_generation_leaves_no_asset() {
        let provider =
            MockProvider::new("https://assets.test").with_latency(Duration::from_millis(150));
        let state = state_with(Arc::new(provider)).await;

        let task = state.tasks.create("a cat", vec![]).await.unwrap();
        let analysis = analysis_for(&state, "a cat");
        spawn_generation(
            state.clone(),
            GenerationRequest {
                task_id: task.task_id,
                prompt: "a cat".into(),
                reference_images: vec![],
                analysis,
            },
        );

        // Fail the task while the provider is still generating.
        tokio::time::sleep(Duration::from_millis(30)).await;
        state.tasks.fail(task.task_id, "client abort").await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let snapshot = state.tasks.get(task.task_id).await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Failed);
        assert_eq!(snapshot.error_message.as_deref(), Some("client abort"));

        let (assets, total) = state.assets.list_assets(None, Page::new(1, 10)).await.unwrap();
        assert!(assets.is_empty());
        assert_eq!(total, 0);
    }
}
