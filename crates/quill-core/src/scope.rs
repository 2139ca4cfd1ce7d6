//! Named collection rules over the post set.
//!
//! Filters delegate to the entity predicates, so collection membership and
//! per-entity lifecycle checks cannot drift apart. Callers must evaluate
//! every filter in a request against a single `now` snapshot.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::Post;

/// Named filters over the post set, one per lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    Draft,
    Published,
    Scheduled,
}

impl PostFilter {
    /// Membership test for a single post.
    pub fn matches(&self, post: &Post, now: DateTime<Utc>) -> bool {
        match self {
            PostFilter::Draft => post.is_draft(),
            PostFilter::Published => post.is_published(now),
            PostFilter::Scheduled => post.is_scheduled(now),
        }
    }
}

/// The `sorted` ordering: `published_at` descending with drafts (no
/// timestamp) first, then `updated_at` descending as tie-break. Drafts
/// surface at the top of an authoring view; among dated posts, most
/// recently published first.
pub fn sorted_order(a: &Post, b: &Post) -> Ordering {
    let by_published = match (a.published_at, b.published_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => right.cmp(&left),
    };
    by_published.then_with(|| b.updated_at.cmp(&a.updated_at))
}
