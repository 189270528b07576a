use crate::models::Follow;
use sqlx::PgPool;

/// Insert a follow edge if absent. Returns None when the edge already
/// exists; the unique constraint arbitrates concurrent follows.
pub async fn insert_follow(
    pool: &PgPool,
    follower_id: &str,
    following_id: &str,
) -> Result<Option<Follow>, sqlx::Error> {
    let follow = sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (follower_id, following_id)
        VALUES ($1, $2)
        ON CONFLICT (follower_id, following_id) DO NOTHING
        RETURNING id, follower_id, following_id, created_at
        "#,
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_optional(pool)
    .await?;

    Ok(follow)
}

/// Delete a follow edge. Returns true if a row was removed.
pub async fn delete_follow(
    pool: &PgPool,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM follows
        WHERE follower_id = $1 AND following_id = $2
        "#,
    )
    .bind(follower_id)
    .bind(following_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether follower follows following
pub async fn edge_exists(
    pool: &PgPool,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM follows
            WHERE follower_id = $1 AND following_id = $2
        )
        "#,
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// All author ids the given user follows. Feed queries re-derive this on
/// every call; no denormalized follower list is cached.
pub async fn following_ids(pool: &PgPool, follower_id: &str) -> Result<Vec<String>, sqlx::Error> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT following_id
        FROM follows
        WHERE follower_id = $1
        "#,
    )
    .bind(follower_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
