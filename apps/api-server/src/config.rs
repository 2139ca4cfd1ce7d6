//! Application configuration loaded from environment variables.

use std::env;

use quill_core::pagination::DEFAULT_PAGE_SIZE;
use quill_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Items per listing page.
    pub page_size: u64,
    /// When set, edit/delete require the caller to be the recorded author.
    /// Off by default: historically any signed-in user could modify any
    /// post, and deployments opt into the stricter policy explicitly.
    pub enforce_post_ownership: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            enforce_post_ownership: env::var("POST_OWNERSHIP_CHECK")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
