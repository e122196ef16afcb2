//! Click Analytics Service - Main Application Entry Point
//!
//! A read-only REST API answering aggregate and detail questions about clicks
//! on a user's short URLs. URLs and clicks are written by the ingestion side;
//! this service only reads them (and creates user rows on first sight).
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: username lookup-or-create, or API key
//! - **Format**: JSON responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool (lazily if the database is down)
//! 3. Optionally run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Serve until Ctrl+C / SIGTERM, then drain and close the pool

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod tests;

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware as axum_middleware, routing::get};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::{config::AuthMode, db::DbPool};

/// Process-wide state shared with every handler.
///
/// Built once in `main` and handed to the router; the pool inside is the only
/// resource owned by the service and is closed after the server drains.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_mode: AuthMode,
}

/// Build the HTTP router.
///
/// `/health` is public; everything under `/api/analytics` goes through the
/// auth middleware first.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let analytics_routes = Router::new()
        .route(
            "/api/analytics/summary",
            get(handlers::analytics::summary),
        )
        .route(
            "/api/analytics/top-urls",
            get(handlers::analytics::top_urls),
        )
        .route(
            "/api/analytics/time-series",
            get(handlers::analytics::time_series),
        )
        .route(
            "/api/analytics/url/{url_id}",
            get(handlers::analytics::url_analytics),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(analytics_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(auth_mode = ?config.auth_mode, "Configuration loaded");

    let pool = match db::create_pool(&config).await {
        Ok(pool) => {
            tracing::info!("Database pool created");
            if config.run_migrations {
                db::run_migrations(&pool).await?;
                tracing::info!("Database migrations complete");
            }
            pool
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to connect to database");
            tracing::warn!(
                "Starting without a database connection; queries will fail until it is reachable"
            );
            db::create_lazy_pool(&config)?
        }
    };

    let state = AppState {
        pool: pool.clone(),
        auth_mode: config.auth_mode,
    };
    let app = app(state, config.request_timeout());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Database pool closed, shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C signal"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("Received SIGTERM signal");
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM signal"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
