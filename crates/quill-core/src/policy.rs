//! Access decisions for the post surface.
//!
//! The caller identity is an explicit value threaded into every decision,
//! never ambient state. Anonymous callers see only published posts; a
//! filtered-out id must be reported exactly like a missing one, so the
//! existence of unpublished content never leaks.

use uuid::Uuid;

use crate::domain::Post;
use crate::scope::PostFilter;

/// Caller identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Uuid),
}

impl Caller {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }
}

/// The visibility gate applied before any other scope runs. `None` means
/// the caller sees the full set.
pub fn visibility_filter(caller: Caller) -> Option<PostFilter> {
    match caller {
        Caller::Anonymous => Some(PostFilter::Published),
        Caller::User(_) => None,
    }
}

/// Whether `caller` may create posts.
pub fn can_create(caller: Caller) -> bool {
    caller.is_authenticated()
}

/// Whether `caller` may edit or delete `post`.
///
/// With `enforce_ownership` off, any authenticated caller may modify any
/// post - the behavior the system shipped with. The flag lets a deployment
/// restrict edits to the recorded author without a code change; authorless
/// posts stay editable by any authenticated caller either way.
pub fn can_modify(caller: Caller, post: &Post, enforce_ownership: bool) -> bool {
    match caller {
        Caller::Anonymous => false,
        Caller::User(user_id) => {
            !enforce_ownership || post.author_id.is_none_or(|author| author == user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author_id: Option<Uuid>) -> Post {
        Post::new("Title".into(), "Body".into(), None, author_id)
    }

    #[test]
    fn anonymous_callers_see_only_published() {
        assert_eq!(
            visibility_filter(Caller::Anonymous),
            Some(PostFilter::Published)
        );
        assert_eq!(visibility_filter(Caller::User(Uuid::new_v4())), None);
    }

    #[test]
    fn only_authenticated_callers_create() {
        assert!(!can_create(Caller::Anonymous));
        assert!(can_create(Caller::User(Uuid::new_v4())));
    }

    #[test]
    fn anonymous_callers_never_modify() {
        let post = post_by(None);
        assert!(!can_modify(Caller::Anonymous, &post, false));
        assert!(!can_modify(Caller::Anonymous, &post, true));
    }

    #[test]
    fn any_authenticated_caller_modifies_without_enforcement() {
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let post = post_by(Some(author));
        assert!(can_modify(Caller::User(stranger), &post, false));
    }

    #[test]
    fn enforcement_restricts_to_the_author() {
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let post = post_by(Some(author));
        assert!(can_modify(Caller::User(author), &post, true));
        assert!(!can_modify(Caller::User(stranger), &post, true));
    }

    #[test]
    fn authorless_posts_stay_editable_under_enforcement() {
        let post = post_by(None);
        assert!(can_modify(Caller::User(Uuid::new_v4()), &post, true));
    }
}
