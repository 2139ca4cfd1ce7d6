use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldError};

/// Publication state of a post. Derived from `published_at` and the
/// evaluation instant; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Draft,
    Published,
    Scheduled,
}

/// Cover image attachment metadata. The bytes themselves live in the
/// attachment store under `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    pub key: String,
    pub filename: String,
    pub content_type: String,
}

/// Post entity - a rich-text article with an optional publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Sole driver of the publication lifecycle. `None` means draft.
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub cover_image: Option<CoverImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Leaving `published_at` unset creates a draft;
    /// a past timestamp publishes immediately, a future one schedules.
    pub fn new(
        title: String,
        body: String,
        published_at: Option<DateTime<Utc>>,
        author_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            body,
            published_at,
            author_id,
            cover_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a mutation. `updated_at` is also the tie-break sort key, so
    /// every update call touches it.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    /// The publish boundary is inclusive: `published_at == now` is published.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at <= now)
    }

    pub fn is_scheduled(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at > now)
    }

    /// Exactly one lifecycle state holds at any evaluation instant.
    pub fn lifecycle(&self, now: DateTime<Utc>) -> Lifecycle {
        match self.published_at {
            None => Lifecycle::Draft,
            Some(at) if at <= now => Lifecycle::Published,
            Some(_) => Lifecycle::Scheduled,
        }
    }

    /// Presence validation for the required fields.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::blank("title"));
        }
        if self.body.trim().is_empty() {
            errors.push(FieldError::blank("body"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post(published_at: Option<DateTime<Utc>>) -> Post {
        Post::new("Title".into(), "Body".into(), published_at, None)
    }

    #[test]
    fn draft_has_no_publish_time() {
        let now = Utc::now();
        let p = post(None);
        assert!(p.is_draft());
        assert!(!p.is_published(now));
        assert!(!p.is_scheduled(now));
        assert_eq!(p.lifecycle(now), Lifecycle::Draft);
    }

    #[test]
    fn past_publish_time_is_published() {
        let now = Utc::now();
        let p = post(Some(now - TimeDelta::hours(1)));
        assert!(!p.is_draft());
        assert!(p.is_published(now));
        assert!(!p.is_scheduled(now));
        assert_eq!(p.lifecycle(now), Lifecycle::Published);
    }

    #[test]
    fn future_publish_time_is_scheduled() {
        let now = Utc::now();
        let p = post(Some(now + TimeDelta::hours(1)));
        assert!(!p.is_draft());
        assert!(!p.is_published(now));
        assert!(p.is_scheduled(now));
        assert_eq!(p.lifecycle(now), Lifecycle::Scheduled);
    }

    #[test]
    fn publish_boundary_is_inclusive() {
        let now = Utc::now();
        let p = post(Some(now));
        assert!(p.is_published(now));
        assert!(!p.is_scheduled(now));
        assert_eq!(p.lifecycle(now), Lifecycle::Published);
    }

    #[test]
    fn exactly_one_state_holds() {
        let now = Utc::now();
        let candidates = [
            post(None),
            post(Some(now - TimeDelta::days(30))),
            post(Some(now)),
            post(Some(now + TimeDelta::seconds(1))),
            post(Some(now + TimeDelta::days(365))),
        ];
        for p in &candidates {
            let states = [p.is_draft(), p.is_published(now), p.is_scheduled(now)];
            assert_eq!(states.iter().filter(|s| **s).count(), 1, "{:?}", p.published_at);
        }
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        let p = Post::new("".into(), "  ".into(), None, None);
        let err = p.validate().unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["title", "body"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_present_fields() {
        assert!(post(None).validate().is_ok());
    }
}
