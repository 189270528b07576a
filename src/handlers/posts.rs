/// Post handlers - feeds, single posts, creation, deletion, comments
use crate::error::{AppError, Result};
use crate::handlers::{check_rate_limit, validate_request, PageQuery};
use crate::identity::IdentityResolver;
use crate::middleware::ActorId;
use crate::ratelimit::RateLimiter;
use crate::services::{FeedAssembler, FeedScope, PostAggregator, PostService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 1024,
        message = "length must be between 1 and 1024 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1024,
        message = "length must be between 1 and 1024 characters"
    ))]
    pub content: String,
}

fn assembler(pool: &PgPool, resolver: Arc<IdentityResolver>) -> FeedAssembler {
    let aggregator = Arc::new(PostAggregator::new(pool.clone(), resolver));
    FeedAssembler::new(pool.clone(), aggregator)
}

/// Global feed, newest first
pub async fn get_posts(
    pool: web::Data<PgPool>,
    resolver: web::Data<Arc<IdentityResolver>>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (skip, take) = query.bounds();
    let page = assembler(&pool, resolver.get_ref().clone())
        .page(FeedScope::Global, skip, take)
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Single enriched post
pub async fn get_post(
    pool: web::Data<PgPool>,
    resolver: web::Data<Arc<IdentityResolver>>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = PostService::new((**pool).clone()).get_post(*post_id).await?;

    let aggregator = PostAggregator::new((**pool).clone(), resolver.get_ref().clone());
    let enriched = aggregator
        .enrich(vec![post])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("enrichment returned an empty batch".to_string()))?;

    Ok(HttpResponse::Ok().json(enriched))
}

/// A single author's posts
pub async fn get_user_posts(
    pool: web::Data<PgPool>,
    resolver: web::Data<Arc<IdentityResolver>>,
    user_id: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (skip, take) = query.bounds();
    let page = assembler(&pool, resolver.get_ref().clone())
        .page(FeedScope::ByAuthor(user_id.into_inner()), skip, take)
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Posts from every author the given user follows
pub async fn get_followed_feed(
    pool: web::Data<PgPool>,
    resolver: web::Data<Arc<IdentityResolver>>,
    user_id: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (skip, take) = query.bounds();
    let page = assembler(&pool, resolver.get_ref().clone())
        .page(
            FeedScope::ByFollowedAuthorsOf(user_id.into_inner()),
            skip,
            take,
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a post
pub async fn create_post(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    validate_request(&*req)?;
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    let post = PostService::new((**pool).clone())
        .create_post(&actor.0, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Delete a post (author only)
pub async fn delete_post(
    pool: web::Data<PgPool>,
    actor: ActorId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    PostService::new((**pool).clone())
        .delete_post(*post_id, &actor.0)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "post deleted" })))
}

/// Comment on a post
pub async fn create_comment(
    pool: web::Data<PgPool>,
    limiter: web::Data<dyn RateLimiter>,
    actor: ActorId,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    validate_request(&*req)?;
    check_rate_limit(limiter.get_ref(), &actor.0).await?;

    let comment = PostService::new((**pool).clone())
        .add_comment(*post_id, &actor.0, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}
