//! In-memory repositories - the fallback when no database is configured,
//! and the backing store for handler tests.
//!
//! Filtering and ordering go straight through `quill_core::scope`, so this
//! path cannot disagree with the entity predicates. Note: data is lost on
//! process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{BlogPost, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, BlogPostRepository, PostRepository, UserRepository,
};
use quill_core::scope::{self, PostFilter};

/// In-memory post repository backed by a HashMap.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_sorted(
        &self,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().cloned().collect();
        if let Some(filter) = filter {
            posts.retain(|p| filter.matches(p, now));
        }
        posts.sort_by(scope::sorted_order);
        Ok(posts)
    }

    async fn find_filtered(
        &self,
        id: Uuid,
        filter: Option<PostFilter>,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let found = self.store.read().await.get(&id).cloned();
        Ok(found.filter(|p| filter.is_none_or(|f| f.matches(p, now))))
    }
}

/// In-memory legacy blog post repository.
#[derive(Default)]
pub struct InMemoryBlogPostRepository {
    store: RwLock<HashMap<Uuid, BlogPost>>,
}

impl InMemoryBlogPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<BlogPost, Uuid> for InMemoryBlogPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: BlogPost) -> Result<BlogPost, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepository {
    async fn list_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<BlogPost> = store.values().cloned().collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }
}

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post(published_at: Option<DateTime<Utc>>) -> Post {
        Post::new("Title".into(), "Body".into(), published_at, None)
    }

    #[tokio::test]
    async fn filters_partition_the_stored_set() {
        let repo = InMemoryPostRepository::new();
        let now = Utc::now();

        for published_at in [
            None,
            None,
            Some(now - TimeDelta::days(1)),
            Some(now),
            Some(now + TimeDelta::days(1)),
        ] {
            repo.save(post(published_at)).await.unwrap();
        }

        let all = repo.list_sorted(None, now).await.unwrap();
        let drafts = repo.list_sorted(Some(PostFilter::Draft), now).await.unwrap();
        let published = repo
            .list_sorted(Some(PostFilter::Published), now)
            .await
            .unwrap();
        let scheduled = repo
            .list_sorted(Some(PostFilter::Scheduled), now)
            .await
            .unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(drafts.len(), 2);
        assert_eq!(published.len(), 2);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(drafts.len() + published.len() + scheduled.len(), all.len());
    }

    #[tokio::test]
    async fn listing_is_sorted_drafts_first() {
        let repo = InMemoryPostRepository::new();
        let now = Utc::now();

        let published = repo
            .save(post(Some(now - TimeDelta::hours(2))))
            .await
            .unwrap();
        let draft = repo.save(post(None)).await.unwrap();

        let all = repo.list_sorted(None, now).await.unwrap();
        assert_eq!(all[0].id, draft.id);
        assert_eq!(all[1].id, published.id);
    }

    #[tokio::test]
    async fn filtered_find_hides_non_matching_rows() {
        let repo = InMemoryPostRepository::new();
        let now = Utc::now();

        let draft = repo.save(post(None)).await.unwrap();

        let visible = repo
            .find_filtered(draft.id, Some(PostFilter::Published), now)
            .await
            .unwrap();
        assert!(visible.is_none());

        let unfiltered = repo.find_filtered(draft.id, None, now).await.unwrap();
        assert_eq!(unfiltered.map(|p| p.id), Some(draft.id));
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let repo = InMemoryPostRepository::new();
        let saved = repo.save(post(None)).await.unwrap();

        repo.delete(saved.id).await.unwrap();
        assert!(matches!(
            repo.delete(saved.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn finds_users_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .save(User::new("author@example.com".into(), "hash".into()))
            .await
            .unwrap();

        let found = repo.find_by_email("author@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
