//! Health check endpoint for service monitoring.

use crate::{AppState, db};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: &'static str,

    /// Whether the database answered the probe query
    pub database: bool,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// No authentication, no side effects.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": true,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// # Response (503 Service Unavailable)
///
/// Same shape with `"status": "unhealthy"` and `"database": false`.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = match db::ping(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(error = %err, "database health check failed");
            false
        }
    };

    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database: healthy,
            timestamp: Utc::now(),
        }),
    )
}
