//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use quill_core::domain::{BlogPost, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BlogPostRepository, PostRepository, UserRepository};
use quill_core::scope::PostFilter;

use super::entity::blog_post::{self, Entity as BlogPostEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL legacy blog post repository.
pub type PostgresBlogPostRepository = PostgresBaseRepository<BlogPostEntity>;

/// SQL rendering of a `PostFilter` against the caller's `now` snapshot.
/// Must stay in lock-step with `PostFilter::matches`: the publish boundary
/// is inclusive (`<=`), the scheduled one strict (`>`).
fn filter_condition(filter: PostFilter, now: DateTime<Utc>) -> Condition {
    match filter {
        PostFilter::Draft => Condition::all().add(post::Column::PublishedAt.is_null()),
        PostFilter::Published => Condition::all().add(post::Column::PublishedAt.lte(now)),
        PostFilter::Scheduled => Condition::all().add(post::Column::PublishedAt.gt(now)),
    }
}

/// SQL rendering of the `sorted` ordering: `published_at` descending with
/// nulls (drafts) first, then `updated_at` descending.
fn apply_sorted(select: Select<PostEntity>) -> Select<PostEntity> {
    select
        .order_by_with_nulls(post::Column::PublishedAt, Order::Desc, NullOrdering::First)
        .order_by_desc(post::Column::UpdatedAt)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_sorted(
        &self,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(filter) = filter {
            select = select.filter(filter_condition(filter, now));
        }

        let rows = apply_sorted(select)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_filtered(
        &self,
        id: Uuid,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut select = PostEntity::find_by_id(id);
        if let Some(filter) = filter {
            select = select.filter(filter_condition(filter, now));
        }

        let row = select
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl BlogPostRepository for PostgresBlogPostRepository {
    async fn list_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        let rows = BlogPostEntity::find()
            .order_by_asc(blog_post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
