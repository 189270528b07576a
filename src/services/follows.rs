/// Follow graph - follower/following edge maintenance
///
/// Edges carry no cascading effects: feed queries re-derive the follow set
/// on every call, so creating or removing an edge needs no invalidation.
use crate::db::follow_repo;
use crate::error::{AppError, Result};
use crate::models::Follow;
use sqlx::PgPool;

#[derive(Clone)]
pub struct FollowGraph {
    pool: PgPool,
}

impl FollowGraph {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a follow edge. Conflict if it already exists. Self-follows
    /// are rejected outright.
    pub async fn follow(&self, follower_id: &str, following_id: &str) -> Result<Follow> {
        if follower_id == following_id {
            return Err(AppError::validation(
                "following_id",
                "cannot follow yourself",
            ));
        }

        follow_repo::insert_follow(&self.pool, follower_id, following_id)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("already following user {}", following_id))
            })
    }

    /// Remove a follow edge. NotFound if it does not exist.
    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<()> {
        let removed = follow_repo::delete_follow(&self.pool, follower_id, following_id).await?;
        if removed {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "not following user {}",
                following_id
            )))
        }
    }

    /// Existence check for a follow edge
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        Ok(follow_repo::edge_exists(&self.pool, follower_id, following_id).await?)
    }
}
