/// Profile handlers - direct directory lookups
use crate::error::Result;
use crate::identity::IdentityResolver;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Look up a profile by username, falling back to external handles
pub async fn get_user_by_username(
    resolver: web::Data<Arc<IdentityResolver>>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let profile = resolver.resolve_by_username(&username).await?;
    Ok(HttpResponse::Ok().json(profile))
}
