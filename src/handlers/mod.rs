/// HTTP handlers - the procedure surface
///
/// Queries are public; mutations require an authenticated actor and pass
/// through the rate limiter before touching any state. Handlers construct
/// the services they need per request over the shared pool.
pub mod follows;
pub mod posts;
pub mod profiles;
pub mod reactions;

pub use follows::{follow_user, is_following, unfollow_user};
pub use posts::{
    create_comment, create_post, delete_post, get_followed_feed, get_post, get_posts,
    get_user_posts,
};
pub use profiles::get_user_by_username;
pub use reactions::{add_reaction, remove_reaction};

use crate::error::{AppError, Result};
use crate::ratelimit::RateLimiter;
use serde::Deserialize;
use validator::Validate;

/// Source page cap: feeds never return more than 100 posts at once.
const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

impl PageQuery {
    /// Effective (skip, take): skip floors at 0, take defaults to the page
    /// cap and is clamped into 1..=100.
    pub fn bounds(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let take = self.take.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (skip, take)
    }
}

/// Gate a mutation on the actor's sliding window.
pub(crate) async fn check_rate_limit(limiter: &dyn RateLimiter, actor_id: &str) -> Result<()> {
    if limiter.allow(actor_id).await? {
        Ok(())
    } else {
        Err(AppError::TooManyRequests)
    }
}

/// Run validator-derive checks, converting the first failure into a typed
/// validation error that names the field.
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|errors| {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), "invalid value".to_string()));
        AppError::validation(&field, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_default_and_clamp() {
        let query = PageQuery {
            skip: None,
            take: None,
        };
        assert_eq!(query.bounds(), (0, 100));

        let query = PageQuery {
            skip: Some(-5),
            take: Some(500),
        };
        assert_eq!(query.bounds(), (0, 100));

        let query = PageQuery {
            skip: Some(20),
            take: Some(10),
        };
        assert_eq!(query.bounds(), (20, 10));

        let query = PageQuery {
            skip: Some(0),
            take: Some(0),
        };
        assert_eq!(query.bounds(), (0, 1));
    }

    #[test]
    fn validation_failure_names_the_field() {
        #[derive(Validate)]
        struct Dto {
            #[validate(length(min = 1, max = 4, message = "length out of range"))]
            content: String,
        }

        let err = validate_request(&Dto {
            content: "too long".to_string(),
        })
        .unwrap_err();

        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "content");
                assert_eq!(message, "length out of range");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
