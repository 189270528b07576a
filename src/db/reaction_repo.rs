use crate::models::{Reaction, ReactionType};
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a reaction if the (user, post, type) triple is absent.
///
/// Returns None when the unique constraint already holds a matching row, so
/// concurrent duplicate adds resolve at the database rather than in
/// application-level read-then-write.
pub async fn insert_reaction(
    pool: &PgPool,
    user_id: &str,
    post_id: Uuid,
    kind: ReactionType,
) -> Result<Option<Reaction>, sqlx::Error> {
    let reaction = sqlx::query_as::<_, Reaction>(
        r#"
        INSERT INTO reactions (user_id, post_id, type)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, post_id, type) DO NOTHING
        RETURNING id, user_id, post_id, type, created_at
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(kind)
    .fetch_optional(pool)
    .await?;

    Ok(reaction)
}

/// Delete the single matching reaction. Returns true if a row was removed.
pub async fn delete_reaction(
    pool: &PgPool,
    user_id: &str,
    post_id: Uuid,
    kind: ReactionType,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM reactions
        WHERE user_id = $1 AND post_id = $2 AND type = $3
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(kind)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Reactions for a whole set of posts in one query
pub async fn list_by_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<Reaction>, sqlx::Error> {
    let reactions = sqlx::query_as::<_, Reaction>(
        r#"
        SELECT id, user_id, post_id, type, created_at
        FROM reactions
        WHERE post_id = ANY($1)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    Ok(reactions)
}
