use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_service::config::Config;
use pulse_service::handlers;
use pulse_service::identity::{HttpIdentityDirectory, IdentityDirectory, IdentityResolver};
use pulse_service::middleware::BearerAuthMiddleware;
use pulse_service::ratelimit::{RateLimiter, RedisRateLimiter};

struct HealthState {
    db_pool: PgPool,
    redis: ConnectionManager,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "pulse-service",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "pulse-service",
        })),
    }
}

async fn readiness_check(state: web::Data<HealthState>) -> HttpResponse {
    let postgres_ok = sqlx::query("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
        .is_ok();

    let mut conn = state.redis.clone();
    let redis_ok = redis::cmd("PING")
        .query_async::<_, String>(&mut conn)
        .await
        .map(|pong| pong == "PONG")
        .unwrap_or(false);

    let ready = postgres_ok && redis_ok;
    let body = serde_json::json!({
        "ready": ready,
        "checks": {
            "postgresql": if postgres_ok { "healthy" } else { "unhealthy" },
            "redis": if redis_ok { "healthy" } else { "unhealthy" },
        },
    });

    if ready {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Starting pulse-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&db_pool)
        .await
        .context("Failed to verify database connection")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database pool created, migrations applied");

    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("Failed to create Redis client")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    let limiter: Arc<dyn RateLimiter> =
        Arc::new(RedisRateLimiter::new(redis_conn.clone(), &config.rate_limit));
    info!(
        "Rate limiter: {} actions per {}s sliding window",
        config.rate_limit.max_actions, config.rate_limit.window_seconds
    );

    let directory: Arc<dyn IdentityDirectory> = Arc::new(
        HttpIdentityDirectory::new(&config.identity)
            .context("Failed to build identity directory client")?,
    );
    let resolver = Arc::new(IdentityResolver::new(directory));
    info!("Identity directory: {}", config.identity.base_url);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("Starting HTTP server at {}", bind_address);

    let limiter_data: web::Data<dyn RateLimiter> = web::Data::from(limiter);
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
        redis: redis_conn,
    });
    let allowed_origins = config.cors.allowed_origins.clone();
    let jwt_secret = config.auth.jwt_secret.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(resolver.clone()))
            .app_data(limiter_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_check))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .wrap(BearerAuthMiddleware::new(jwt_secret.clone()))
                    .service(
                        web::scope("/posts")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::get_posts))
                                    .route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/user/{user_id}")
                                    .route(web::get().to(handlers::get_user_posts)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            )
                            .service(
                                web::resource("/{post_id}/comments")
                                    .route(web::post().to(handlers::create_comment)),
                            )
                            .service(
                                web::resource("/{post_id}/reactions")
                                    .route(web::post().to(handlers::add_reaction))
                                    .route(web::delete().to(handlers::remove_reaction)),
                            ),
                    )
                    .service(
                        web::scope("/feed").service(
                            web::resource("/following/{user_id}")
                                .route(web::get().to(handlers::get_followed_feed)),
                        ),
                    )
                    .service(
                        web::scope("/follows")
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::follow_user)),
                            )
                            .service(
                                web::resource("/{user_id}")
                                    .route(web::get().to(handlers::is_following))
                                    .route(web::delete().to(handlers::unfollow_user)),
                            ),
                    )
                    .service(
                        web::scope("/profiles").service(
                            web::resource("/{username}")
                                .route(web::get().to(handlers::get_user_by_username)),
                        ),
                    ),
            )
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}
