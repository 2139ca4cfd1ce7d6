//! Attachment store port - binary blob storage for cover images.

use async_trait::async_trait;

/// Blob storage keyed by opaque string keys.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store a blob and return the key addressing it. Content metadata
    /// stays with the owning entity, not the blob.
    async fn put(&self, bytes: Vec<u8>) -> Result<String, AttachmentError>;

    /// Fetch a blob by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AttachmentError>;

    /// Remove a blob. Removing a missing key is a no-op, so deferred purge
    /// jobs stay idempotent across retries.
    async fn delete(&self, key: &str) -> Result<(), AttachmentError>;
}

/// Attachment store errors.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}
