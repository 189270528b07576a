/// Pulse Service Library
///
/// Social feed backend: short text posts, comments, typed reactions, and
/// follow relationships, served as enriched paginated feeds. Profiles come
/// from an external identity directory and are joined in at aggregation
/// time; all mutations pass through a sliding-window rate limiter.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers (the procedure surface)
/// - `services`: aggregation, feed assembly, ledgers
/// - `db`: repositories over PostgreSQL
/// - `identity`: external identity directory client and batch resolver
/// - `ratelimit`: sliding-window rate limiting
/// - `middleware`: bearer-token authentication
/// - `models`: entities and enriched view structs
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod ratelimit;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
