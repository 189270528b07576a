/// Follow handlers
use crate::error::Result;
use crate::handlers::check_rate_limit;
use crate::middleware::ActorId;
use crate::ratelimit::RateLimiter;
use crate::services::FollowGraph;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub following_id: String,
}

/// Follow a user
pub async fn follow_user(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    req: web::Json<FollowRequest>,
) -> Result<HttpResponse> {
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    let follow = FollowGraph::new((**pool).clone())
        .follow(&actor.0, &req.following_id)
        .await?;

    Ok(HttpResponse::Created().json(follow))
}

/// Unfollow a user
pub async fn unfollow_user(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    following_id: web::Path<String>,
) -> Result<HttpResponse> {
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    FollowGraph::new((**pool).clone())
        .unfollow(&actor.0, &following_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "unfollowed" })))
}

/// Does the authenticated actor follow the given user?
pub async fn is_following(
    pool: web::Data<PgPool>,
    actor: ActorId,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let following = FollowGraph::new((**pool).clone())
        .is_following(&actor.0, &user_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "is_following": following })))
}
