/// Post service - creation, owner-checked deletion, comments
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{Comment, Post};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post. Content is validated at the handler boundary.
    pub async fn create_post(&self, author_id: &str, content: &str) -> Result<Post> {
        Ok(post_repo::create_post(&self.pool, author_id, content).await?)
    }

    /// Fetch a live post, NotFound otherwise
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post not found: {}", post_id)))
    }

    /// Delete a post. Only the author may delete; anyone else gets
    /// Forbidden, a missing post gets NotFound.
    pub async fn delete_post(&self, post_id: Uuid, actor_id: &str) -> Result<()> {
        let post = self.get_post(post_id).await?;

        if post.author_id != actor_id {
            return Err(AppError::Forbidden(
                "only the author can delete this post".to_string(),
            ));
        }

        let deleted = post_repo::soft_delete_post(&self.pool, post_id).await?;
        if deleted {
            Ok(())
        } else {
            // Lost the race against another delete of the same post.
            Err(AppError::NotFound(format!("post not found: {}", post_id)))
        }
    }

    /// Add a comment to an existing post
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: &str,
        content: &str,
    ) -> Result<Comment> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post not found: {}", post_id)));
        }

        Ok(comment_repo::create_comment(&self.pool, post_id, author_id, content).await?)
    }
}
