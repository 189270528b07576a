/// Feed assembly - paginated, enriched feed slices
use crate::db::{follow_repo, post_repo};
use crate::error::Result;
use crate::models::EnrichedPost;
use crate::services::PostAggregator;
use sqlx::PgPool;
use std::sync::Arc;

/// Which posts a page covers
#[derive(Debug, Clone)]
pub enum FeedScope {
    /// Every author, newest first
    Global,
    /// A single author's posts
    ByAuthor(String),
    /// Posts by every author the given user follows
    ByFollowedAuthorsOf(String),
}

pub struct FeedAssembler {
    pool: PgPool,
    aggregator: Arc<PostAggregator>,
}

impl FeedAssembler {
    pub fn new(pool: PgPool, aggregator: Arc<PostAggregator>) -> Self {
        Self { pool, aggregator }
    }

    /// One enriched page. Ordering is `created_at DESC, id DESC` down in
    /// SQL, so repeated calls over stable data page identically. Callers
    /// detect end-of-feed when the page comes back shorter than `take`.
    pub async fn page(
        &self,
        scope: FeedScope,
        skip: i64,
        take: i64,
    ) -> Result<Vec<EnrichedPost>> {
        let posts = match scope {
            FeedScope::Global => post_repo::list_recent(&self.pool, take, skip).await?,
            FeedScope::ByAuthor(author_id) => {
                post_repo::list_by_author(&self.pool, &author_id, take, skip).await?
            }
            FeedScope::ByFollowedAuthorsOf(user_id) => {
                let authors = follow_repo::following_ids(&self.pool, &user_id).await?;
                if authors.is_empty() {
                    return Ok(Vec::new());
                }
                post_repo::list_by_authors(&self.pool, &authors, take, skip).await?
            }
        };

        self.aggregator.enrich(posts).await
    }
}
