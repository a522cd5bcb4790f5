//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for atelier-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other) database URL (default: `"sqlite://atelier.db?mode=rwc"`).
    /// Supports any sqlx-compatible connection string.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allowlist; `None` means wildcard (dev).
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (default `true`; disable in
    /// production to avoid exposing the API structure).
    pub enable_swagger: bool,

    /// Number of task-store partitions; unrelated tasks never contend.
    pub task_shards: usize,

    /// Base URL under which generated assets are served.
    pub asset_base_url: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("ATELIER_BIND", "0.0.0.0:3000"),
            database_url: env_or("ATELIER_DATABASE_URL", "sqlite://atelier.db?mode=rwc"),
            log_level: env_or("ATELIER_LOG", "info"),
            log_json: std::env::var("ATELIER_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("ATELIER_CORS_ORIGINS").ok(),
            enable_swagger: std::env::var("ATELIER_ENABLE_SWAGGER")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            task_shards: parse_env("ATELIER_TASK_SHARDS", 16),
            asset_base_url: env_or("ATELIER_ASSET_BASE_URL", "https://assets.atelier.local"),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
