/// Post aggregation - the cross-store join
///
/// Posts, comments, and reactions come from Postgres; author profiles come
/// from the identity directory. Enrichment fetches local records first,
/// batch-resolves every author id in one resolver call, then merges.
/// Referential integrity across the two stores is never assumed: an author
/// id the directory cannot resolve (or a profile with no usable username)
/// fails the whole batch rather than producing a partially-enriched page.
use crate::db::{comment_repo, reaction_repo};
use crate::error::{AppError, Result};
use crate::identity::IdentityResolver;
use crate::models::{AuthorView, Comment, CommentView, EnrichedPost, Post, Reaction, UserProfile};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostAggregator {
    pool: PgPool,
    resolver: Arc<IdentityResolver>,
}

impl PostAggregator {
    pub fn new(pool: PgPool, resolver: Arc<IdentityResolver>) -> Self {
        Self { pool, resolver }
    }

    /// Enrich a page of posts, preserving input order.
    ///
    /// One comments query and one reactions query for the whole post set,
    /// one resolver call for all post and comment authors.
    pub async fn enrich(&self, posts: Vec<Post>) -> Result<Vec<EnrichedPost>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let comments = comment_repo::list_by_posts(&self.pool, &post_ids).await?;
        let reactions = reaction_repo::list_by_posts(&self.pool, &post_ids).await?;

        let author_ids: Vec<String> = posts
            .iter()
            .map(|p| p.author_id.clone())
            .chain(comments.iter().map(|c| c.author_id.clone()))
            .collect();
        let profiles = self.resolver.resolve(&author_ids).await?;

        build_views(posts, comments, reactions, &profiles)
    }
}

/// Merge local records with resolved profiles into view structs.
fn build_views(
    posts: Vec<Post>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
    profiles: &HashMap<String, UserProfile>,
) -> Result<Vec<EnrichedPost>> {
    let mut comments_by_post: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment);
    }

    let mut reactions_by_post: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
    for reaction in reactions {
        reactions_by_post
            .entry(reaction.post_id)
            .or_default()
            .push(reaction);
    }

    posts
        .into_iter()
        .map(|post| {
            let author = author_view(profiles, &post.author_id, post.id)?;

            let comments = comments_by_post
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(|comment| {
                    let author = author_view(profiles, &comment.author_id, post.id)?;
                    Ok(CommentView {
                        id: comment.id,
                        content: comment.content,
                        created_at: comment.created_at,
                        author,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let reactions = reactions_by_post.remove(&post.id).unwrap_or_default();

            Ok(EnrichedPost {
                post,
                author,
                comments,
                reactions,
            })
        })
        .collect()
}

fn author_view(
    profiles: &HashMap<String, UserProfile>,
    author_id: &str,
    post_id: Uuid,
) -> Result<AuthorView> {
    let profile = profiles.get(author_id).ok_or_else(|| {
        AppError::Identity(format!(
            "author profile not found: post {}, user {}",
            post_id, author_id
        ))
    })?;

    let username = profile.handle().ok_or_else(|| {
        AppError::Identity(format!("author has no usable username: {}", author_id))
    })?;

    Ok(AuthorView {
        id: profile.id.clone(),
        username: username.to_string(),
        image_url: profile.image_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReactionType;
    use chrono::{TimeZone, Utc};

    fn post(n: u8, author: &str) -> Post {
        Post {
            id: Uuid::from_u128(n as u128),
            author_id: author.to_string(),
            content: format!("post {}", n),
            created_at: Utc.timestamp_opt(1_700_000_000 + n as i64, 0).unwrap(),
            deleted_at: None,
        }
    }

    fn comment(n: u8, post: &Post, author: &str) -> Comment {
        Comment {
            id: Uuid::from_u128(0x100 + n as u128),
            post_id: post.id,
            author_id: author.to_string(),
            content: format!("comment {}", n),
            created_at: Utc.timestamp_opt(1_700_000_100 + n as i64, 0).unwrap(),
        }
    }

    fn reaction(n: u8, post: &Post, user: &str) -> Reaction {
        Reaction {
            id: Uuid::from_u128(0x200 + n as u128),
            user_id: user.to_string(),
            post_id: post.id,
            kind: ReactionType::Like,
            created_at: Utc.timestamp_opt(1_700_000_200 + n as i64, 0).unwrap(),
        }
    }

    fn profile(id: &str, username: Option<&str>, external: Option<&str>) -> (String, UserProfile) {
        (
            id.to_string(),
            UserProfile {
                id: id.to_string(),
                username: username.map(String::from),
                external_username: external.map(String::from),
                image_url: format!("https://img/{}", id),
            },
        )
    }

    #[test]
    fn preserves_input_order_and_attaches_children() {
        let a = post(3, "user_a");
        let b = post(1, "user_b");
        let comments = vec![comment(1, &b, "user_a"), comment(2, &a, "user_b")];
        let reactions = vec![reaction(1, &a, "user_b")];
        let profiles: HashMap<_, _> = [
            profile("user_a", Some("alice"), None),
            profile("user_b", None, Some("bob-gh")),
        ]
        .into();

        let views =
            build_views(vec![a.clone(), b.clone()], comments, reactions, &profiles).unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].post.id, a.id);
        assert_eq!(views[1].post.id, b.id);
        assert_eq!(views[0].author.username, "alice");
        assert_eq!(views[0].comments.len(), 1);
        assert_eq!(views[0].comments[0].author.username, "bob-gh");
        assert_eq!(views[0].reactions.len(), 1);
        assert_eq!(views[1].comments.len(), 1);
        assert!(views[1].reactions.is_empty());
    }

    #[test]
    fn fails_the_batch_when_a_post_author_is_unresolved() {
        let a = post(1, "user_missing");
        let profiles = HashMap::new();

        let err = build_views(vec![a], vec![], vec![], &profiles).unwrap_err();
        assert!(matches!(err, AppError::Identity(_)));
    }

    #[test]
    fn fails_the_batch_when_a_comment_author_is_unresolved() {
        let a = post(1, "user_a");
        let comments = vec![comment(1, &a, "user_ghost")];
        let profiles: HashMap<_, _> = [profile("user_a", Some("alice"), None)].into();

        let err = build_views(vec![a], comments, vec![], &profiles).unwrap_err();
        assert!(matches!(err, AppError::Identity(_)));
    }

    #[test]
    fn fails_when_a_profile_has_no_username_at_all() {
        let a = post(1, "user_a");
        let profiles: HashMap<_, _> = [profile("user_a", None, None)].into();

        let err = build_views(vec![a], vec![], vec![], &profiles).unwrap_err();
        assert!(matches!(err, AppError::Identity(_)));
    }
}
