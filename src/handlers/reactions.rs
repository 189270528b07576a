/// Reaction handlers
use crate::error::Result;
use crate::handlers::check_rate_limit;
use crate::middleware::ActorId;
use crate::models::ReactionType;
use crate::ratelimit::RateLimiter;
use crate::services::ReactionLedger;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Request body naming the reaction type. Unknown types fail
/// deserialization; the set is closed.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

/// Add a typed reaction to a post
pub async fn add_reaction(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    post_id: web::Path<Uuid>,
    req: web::Json<ReactionRequest>,
) -> Result<HttpResponse> {
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    let reaction = ReactionLedger::new((**pool).clone())
        .add(&actor.0, *post_id, req.kind)
        .await?;

    Ok(HttpResponse::Created().json(reaction))
}

/// Remove a typed reaction from a post
pub async fn remove_reaction(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    post_id: web::Path<Uuid>,
    req: web::Json<ReactionRequest>,
) -> Result<HttpResponse> {
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    ReactionLedger::new((**pool).clone())
        .remove(&actor.0, *post_id, req.kind)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "reaction removed" })))
}
