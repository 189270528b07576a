/// Data models for pulse-service
///
/// Persistent entities (posts, comments, reactions, follows) are stored in
/// PostgreSQL. User profiles are not owned by this service: author/user
/// columns carry opaque identity-directory ids as TEXT, and the profile
/// structs here mirror the directory's wire shape.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

/// Post entity - a short text post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Comment entity - a comment on a post, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reaction kind, matching the database reaction_type enum.
///
/// A closed set: unknown tags are rejected at deserialization instead of
/// being stored as free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "reaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
    Fire,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Dislike => "dislike",
            ReactionType::Fire => "fire",
        }
    }
}

/// Reaction entity - unique per (user_id, post_id, type)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: String,
    pub post_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub created_at: DateTime<Utc>,
}

/// Follow edge - unique per (follower_id, following_id)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

/// User profile as returned by the external identity directory.
///
/// Read-only to this service. Either username may be absent; display-name
/// resolution (username, then external_username) happens at aggregation
/// time, and a profile with neither is an aggregation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: Option<String>,
    pub external_username: Option<String>,
    #[serde(default)]
    pub image_url: String,
}

impl UserProfile {
    /// Display handle: `username`, falling back to `external_username`.
    pub fn handle(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.external_username.as_deref())
    }
}

/// Resolved author attached to enriched views. `username` is always present
/// here: aggregation fails loudly instead of emitting a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub username: String,
    pub image_url: String,
}

/// A comment joined with its resolved author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

/// A post joined with its resolved author, comments, and reactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub post: Post,
    pub author: AuthorView,
    pub comments: Vec<CommentView>,
    pub reactions: Vec<Reaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_prefers_username() {
        let profile = UserProfile {
            id: "user_1".into(),
            username: Some("alice".into()),
            external_username: Some("alice-gh".into()),
            image_url: String::new(),
        };
        assert_eq!(profile.handle(), Some("alice"));
    }

    #[test]
    fn handle_falls_back_to_external_username() {
        let profile = UserProfile {
            id: "user_1".into(),
            username: None,
            external_username: Some("alice-gh".into()),
            image_url: String::new(),
        };
        assert_eq!(profile.handle(), Some("alice-gh"));
    }

    #[test]
    fn handle_absent_when_both_missing() {
        let profile = UserProfile {
            id: "user_1".into(),
            username: None,
            external_username: None,
            image_url: String::new(),
        };
        assert_eq!(profile.handle(), None);
    }

    #[test]
    fn reaction_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReactionType::Fire).unwrap(),
            "\"fire\""
        );
        let parsed: ReactionType = serde_json::from_str("\"like\"").unwrap();
        assert_eq!(parsed, ReactionType::Like);
        assert!(serde_json::from_str::<ReactionType>("\"meh\"").is_err());
    }
}
