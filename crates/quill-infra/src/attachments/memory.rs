//! In-memory attachment store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::ports::{AttachmentError, AttachmentStore};

/// In-memory blob store keyed by generated opaque keys.
/// Note: blobs are lost on process restart.
#[derive(Default)]
pub struct InMemoryAttachmentStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<String, AttachmentError> {
        let key = Uuid::new_v4().to_string();
        let mut blobs = self.blobs.write().await;
        blobs.insert(key.clone(), bytes);

        tracing::debug!(%key, "Attachment stored");
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AttachmentError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), AttachmentError> {
        let removed = self.blobs.write().await.remove(key).is_some();
        tracing::debug!(%key, removed, "Attachment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_fetches_blobs() {
        let store = InMemoryAttachmentStore::new();
        let key = store.put(vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryAttachmentStore::new();
        let key = store.put(vec![1]).await.unwrap();

        store.delete(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);

        // Deleting again must still succeed.
        store.delete(&key).await.unwrap();
        store.delete("never-existed").await.unwrap();
    }
}
