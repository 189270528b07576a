/// Error types for pulse-service
///
/// Every failure the core can produce maps to a stable code and an HTTP
/// status. Nothing in here is retried internally; storage and directory
/// failures surface to the caller as-is.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for pulse-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis operation failed
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Request payload failed validation; `field` names the offending input
    #[error("Validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Referenced post/comment/reaction/follow/user is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate reaction or follow edge
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Actor lacks ownership of the target resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Sliding rate window exceeded
    #[error("Too many requests")]
    TooManyRequests,

    /// Missing or invalid actor identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity directory failure or an author id with no resolvable profile
    #[error("Identity resolution failed: {0}")]
    Identity(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, independent of the display message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Cache(_) => "INTERNAL",
            AppError::Validation { .. } => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::TooManyRequests => "TOO_MANY_REQUESTS",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Identity(_) => "INTERNAL",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = serde_json::json!({
            "code": self.code(),
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        if let AppError::Validation { field, .. } = self {
            body["field"] = serde_json::Value::String(field.clone());
        }

        HttpResponse::build(status).json(body)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Identity(err.to_string())
    }
}
