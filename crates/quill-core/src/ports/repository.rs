use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{BlogPost, Post, User};
use crate::error::RepoError;
use crate::scope::PostFilter;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Listing always applies the `sorted` ordering.
///
/// `filter` and `now` travel together: both must come from the single
/// per-request snapshot so every scope in a request agrees on the instant.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts matching `filter` (or every post when `None`), sorted.
    async fn list_sorted(
        &self,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Find by id, additionally requiring `filter` membership when present.
    /// A filtered-out row reads as absent, same as a missing id.
    async fn find_filtered(
        &self,
        id: Uuid,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;
}

/// Legacy blog post repository.
#[async_trait]
pub trait BlogPostRepository: BaseRepository<BlogPost, Uuid> {
    /// Every blog post, unfiltered.
    async fn list_all(&self) -> Result<Vec<BlogPost>, RepoError>;
}
