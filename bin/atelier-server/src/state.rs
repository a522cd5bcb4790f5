//! Shared application state.

use std::sync::Arc;

use atelier_core::TaskStore;

use crate::agent::RoutingAgent;
use crate::config::Config;
use crate::db::sqlite::SqliteStore;
use crate::pipeline::GenerationProvider;

/// Everything the handlers need, shared as `Arc<AppState>`.
pub struct AppState {
    pub config: Arc<Config>,
    /// In-memory task lifecycle registry.
    pub tasks: TaskStore,
    /// Durable asset and gallery store.
    pub assets: SqliteStore,
    pub agent: RoutingAgent,
    pub provider: Arc<dyn GenerationProvider>,
}

#[cfg(test)]
pub(crate) async fn test_state() -> Arc<AppState> {
    use crate::pipeline::MockProvider;

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
    let assets = SqliteStore::connect_in_memory()
        .await
        .expect("in-memory sqlite");
    Arc::new(AppState {
        config: Arc::new(config),
        tasks: TaskStore::new(4),
        assets,
        agent: RoutingAgent::default(),
        provider: Arc::new(MockProvider::new("https://assets.test")),
    })
}
