//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AttachmentStore, BlogPostRepository, JobQueue, PostRepository, UserRepository,
};
use quill_infra::database;
use quill_infra::{
    InMemoryAttachmentStore, InMemoryBlogPostRepository, InMemoryJobQueue,
    InMemoryPostRepository, InMemoryUserRepository, PostgresBlogPostRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub blog_posts: Arc<dyn BlogPostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobQueue>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub page_size: u64,
    pub enforce_ownership: bool,
}

type Repositories = (
    Arc<dyn PostRepository>,
    Arc<dyn BlogPostRepository>,
    Arc<dyn UserRepository>,
);

fn in_memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryBlogPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, blog_posts, users) = match &config.database {
            Some(db_config) => match database::connect(db_config).await {
                Ok(conn) => (
                    Arc::new(PostgresPostRepository::new(conn.clone())) as Arc<dyn PostRepository>,
                    Arc::new(PostgresBlogPostRepository::new(conn.clone()))
                        as Arc<dyn BlogPostRepository>,
                    Arc::new(PostgresUserRepository::new(conn)) as Arc<dyn UserRepository>,
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    in_memory_repositories()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                in_memory_repositories()
            }
        };

        tracing::info!("Application state initialized");

        Self {
            posts,
            blog_posts,
            users,
            jobs: Arc::new(InMemoryJobQueue::default()),
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            page_size: config.page_size,
            enforce_ownership: config.enforce_post_ownership,
        }
    }

    /// Fully in-memory state. Used when no database is configured and as
    /// the backing for handler tests.
    pub fn in_memory(page_size: u64, enforce_ownership: bool) -> Self {
        let (posts, blog_posts, users) = in_memory_repositories();

        Self {
            posts,
            blog_posts,
            users,
            jobs: Arc::new(InMemoryJobQueue::default()),
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            page_size,
            enforce_ownership,
        }
    }
}
