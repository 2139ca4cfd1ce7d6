//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent JSON key from an explicit `null`. With
/// `#[serde(default)]`: absent key -> `None`, `null` -> `Some(None)`,
/// value -> `Some(Some(v))`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Cover image payload carried inline as base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverImageUpload {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Request to create a post. Missing `title`/`body` deserialize to empty
/// strings so presence validation reports them field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_image: Option<CoverImageUpload>,
}

/// Request to update a post. Absent fields are left unchanged; for
/// `published_at` an explicit `null` clears the publish time (back to
/// draft), while an absent key keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub cover_image: Option<CoverImageUpload>,
}

/// Cover image metadata as presented to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverImageResponse {
    pub filename: String,
    pub content_type: String,
}

/// A post as presented to clients. `lifecycle` is derived at response time
/// and is display-only; filtering always happens server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub lifecycle: String,
    pub author_id: Option<Uuid>,
    pub cover_image: Option<CoverImageResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Blog posts (legacy)
// ---------------------------------------------------------------------------

/// Request to create a legacy blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlogPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Request to update a legacy blog post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// A legacy blog post as presented to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page position and totals attached to listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

/// A page of items plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null_published_at() {
        let absent: UpdatePostRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.published_at, None);

        let cleared: UpdatePostRequest =
            serde_json::from_str(r#"{"published_at":null}"#).unwrap();
        assert_eq!(cleared.published_at, Some(None));

        let set: UpdatePostRequest =
            serde_json::from_str(r#"{"published_at":"2024-06-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.published_at, Some(Some(_))));
    }

    #[test]
    fn create_defaults_missing_required_fields_to_empty() {
        let req: CreatePostRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_empty());
        assert!(req.body.is_empty());
    }
}
