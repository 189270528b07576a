/// Reaction ledger - strict create-if-absent / delete-if-present
///
/// Callers that want toggle behavior read the post's reactions and choose
/// which operation to issue; the ledger itself never toggles. A concurrent
/// duplicate add therefore surfaces as Conflict instead of silently
/// duplicating, arbitrated by the unique constraint on
/// (user_id, post_id, type).
use crate::db::{post_repo, reaction_repo};
use crate::error::{AppError, Result};
use crate::models::{Reaction, ReactionType};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReactionLedger {
    pool: PgPool,
}

impl ReactionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a reaction. Conflict if the actor already holds a reaction of
    /// this type on the post; NotFound if the post is gone.
    pub async fn add(
        &self,
        user_id: &str,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<Reaction> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post not found: {}", post_id)));
        }

        reaction_repo::insert_reaction(&self.pool, user_id, post_id, kind)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "reaction '{}' already exists on post {}",
                    kind.as_str(),
                    post_id
                ))
            })
    }

    /// Remove the matching reaction. NotFound if the actor holds none.
    pub async fn remove(
        &self,
        user_id: &str,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<()> {
        let removed = reaction_repo::delete_reaction(&self.pool, user_id, post_id, kind).await?;
        if removed {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "reaction '{}' not found on post {}",
                kind.as_str(),
                post_id
            )))
        }
    }
}
