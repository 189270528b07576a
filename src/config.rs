/// Configuration management for pulse-service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Identity directory configuration
    pub identity: IdentityConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Auth token validation configuration
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL
    pub url: String,
}

/// Identity directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the directory API
    pub base_url: String,
    /// Bearer token for directory requests
    pub api_token: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_identity_timeout_ms")]
    pub timeout_ms: u64,
}

/// Rate limiting configuration (sliding window, shared across all mutations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Max actions per actor within the window
    #[serde(default = "default_rate_limit_max_actions")]
    pub max_actions: u32,
    /// Window length in seconds
    #[serde(default = "default_rate_limit_window_seconds")]
    pub window_seconds: u64,
}

/// Auth token validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret for validating identity-provider tokens
    pub jwt_secret: String,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_identity_timeout_ms() -> u64 {
    5_000
}

fn default_rate_limit_max_actions() -> u32 {
    15
}

fn default_rate_limit_window_seconds() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8082),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL")
                .context("REDIS_URL environment variable not set")?,
        };

        let identity = IdentityConfig {
            base_url: std::env::var("IDENTITY_DIRECTORY_URL")
                .context("IDENTITY_DIRECTORY_URL environment variable not set")?,
            api_token: std::env::var("IDENTITY_DIRECTORY_TOKEN")
                .context("IDENTITY_DIRECTORY_TOKEN environment variable not set")?,
            timeout_ms: std::env::var("IDENTITY_DIRECTORY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_identity_timeout_ms),
        };

        let rate_limit = RateLimitConfig {
            max_actions: std::env::var("RATE_LIMIT_MAX_ACTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_rate_limit_max_actions),
            window_seconds: std::env::var("RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_rate_limit_window_seconds),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        Ok(Config {
            app,
            cors,
            database,
            redis,
            identity,
            rate_limit,
            auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("REDIS_URL", "redis://localhost");
        std::env::set_var("IDENTITY_DIRECTORY_URL", "http://localhost:9200");
        std::env::set_var("IDENTITY_DIRECTORY_TOKEN", "test-token");
        std::env::set_var("JWT_SECRET", "secret");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8082);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.rate_limit.max_actions, 15);
        assert_eq!(config.rate_limit.window_seconds, 60);
        assert_eq!(config.identity.timeout_ms, 5_000);
    }
}
