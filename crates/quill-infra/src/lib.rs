//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! SeaORM repositories with in-memory fallbacks, attachment storage, the
//! purge job queue, and authentication services.

pub mod attachments;
pub mod auth;
pub mod database;
pub mod jobs;

pub use attachments::InMemoryAttachmentStore;
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::memory::{
    InMemoryBlogPostRepository, InMemoryPostRepository, InMemoryUserRepository,
};
pub use database::{
    DatabaseConfig, PostgresBlogPostRepository, PostgresPostRepository, PostgresUserRepository,
};
pub use jobs::InMemoryJobQueue;
