use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// Label used when a guest leaves no name.
pub const ANONYMOUS: &str = "Anonymous";

/// Comment entity - attached to exactly one post.
///
/// Either `author_id` is set (registered commenter) or `guest_name` is,
/// never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Comment left by a registered user.
    pub fn by_user(post_id: Uuid, author_id: Uuid, content: String, is_approved: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id: Some(author_id),
            guest_name: None,
            content,
            is_approved,
            created_at: Utc::now(),
        }
    }

    /// Comment left by an unauthenticated visitor.
    pub fn by_guest(
        post_id: Uuid,
        guest_name: Option<String>,
        content: String,
        is_approved: bool,
    ) -> Self {
        let guest_name = guest_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id: None,
            guest_name: Some(guest_name),
            content,
            is_approved,
            created_at: Utc::now(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.author_id.is_none()
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == Some(user_id)
    }
}

/// Resolve the label shown next to a comment.
///
/// `author` must be the user referenced by the comment's `author_id`, if any.
pub fn display_name(author: Option<&User>, guest_name: Option<&str>) -> String {
    match author {
        Some(user) => {
            let full_name = user.full_name();
            if !full_name.is_empty() {
                return full_name;
            }
            match user.username.split_once('@') {
                Some((local, _)) => title_case(&local.replace(['.', '_', '-', '+'], " ")),
                None => user.username.clone(),
            }
        }
        None => guest_name
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, first: &str, last: &str) -> User {
        User::new(
            username.into(),
            "someone@example.com".into(),
            first.into(),
            last.into(),
            String::new(),
        )
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let jane = user("jdoe", "Jane", "Doe");
        assert_eq!(display_name(Some(&jane), None), "Jane Doe");
    }

    #[test]
    fn test_display_name_from_email_username() {
        let jane = user("jane.doe@example.com", "", "");
        assert_eq!(display_name(Some(&jane), None), "Jane Doe");

        let shouty = user("JOHN_SMITH@example.com", "", "");
        assert_eq!(display_name(Some(&shouty), None), "John Smith");
    }

    #[test]
    fn test_display_name_plain_username() {
        let jdoe = user("jdoe", "", "");
        assert_eq!(display_name(Some(&jdoe), None), "jdoe");
    }

    #[test]
    fn test_display_name_ignores_guest_name_when_author_present() {
        let jdoe = user("jdoe", "", "");
        assert_eq!(display_name(Some(&jdoe), Some("Bob")), "jdoe");
    }

    #[test]
    fn test_display_name_for_guests() {
        assert_eq!(display_name(None, Some("Bob")), "Bob");
        assert_eq!(display_name(None, Some("")), "Anonymous");
        assert_eq!(display_name(None, None), "Anonymous");
    }

    #[test]
    fn test_guest_comment_defaults_name() {
        let post = Uuid::new_v4();

        let named = Comment::by_guest(post, Some("  Bob ".into()), "hi".into(), true);
        assert_eq!(named.guest_name.as_deref(), Some("Bob"));
        assert!(named.is_guest());

        let blank = Comment::by_guest(post, Some("   ".into()), "hi".into(), true);
        assert_eq!(blank.guest_name.as_deref(), Some(ANONYMOUS));

        let missing = Comment::by_guest(post, None, "hi".into(), false);
        assert_eq!(missing.guest_name.as_deref(), Some(ANONYMOUS));
        assert!(!missing.is_approved);
    }

    #[test]
    fn test_user_comment_has_no_guest_name() {
        let author = Uuid::new_v4();
        let comment = Comment::by_user(Uuid::new_v4(), author, "hi".into(), false);

        assert!(comment.guest_name.is_none());
        assert!(comment.is_authored_by(author));
        assert!(!comment.is_authored_by(Uuid::new_v4()));
    }
}
