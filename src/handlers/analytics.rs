//! Analytics HTTP handlers.
//!
//! This module implements the read-only analytics endpoints:
//! - GET /api/analytics/summary - Overall counts
//! - GET /api/analytics/top-urls - URLs ranked by clicks
//! - GET /api/analytics/time-series - Clicks per day
//! - GET /api/analytics/url/{url_id} - Detail view of one URL
//!
//! All of them sit behind the auth middleware, which supplies the `Principal`
//! whose `user_id` scopes every query. Parameters are validated only after
//! authentication, so in username mode a request rejected with 400 has
//! still created its user. Malformed parameters are reported as 400
//! `invalid_request` JSON errors.

use crate::{
    AppState,
    error::AppError,
    extract::{ApiPath, ApiQuery},
    models::analytics::{
        AnalyticsSummary, TimeSeriesPoint, TimeSeriesQuery, TopUrlsQuery, UrlAnalytics, UrlStats,
    },
    services::{analytics_service, principal::Principal},
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

/// Get overall analytics for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/analytics/summary`
///
/// # Response
///
/// - **Success (200 OK)**:
///
/// ```json
/// {
///   "total_urls": 3,
///   "total_clicks": 7,
///   "clicks_today": 5,
///   "clicks_this_week": 7
/// }
/// ```
///
/// - **Error (401)**: Invalid or missing credential
/// - **Error (500)**: Database error
pub async fn summary(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let today = Utc::now().date_naive();
    let summary = analytics_service::summary(&state.pool, principal.user_id, today).await?;

    Ok(Json(summary))
}

/// Get the authenticated user's URLs ranked by click count.
///
/// # Endpoint
///
/// `GET /api/analytics/top-urls?limit=10`
///
/// # Query Parameters
///
/// - `limit` - 1 to 100, defaults to 10
///
/// # Response
///
/// - **Success (200 OK)**: array of `UrlStats`, most clicked first; URLs
///   without clicks are included with `total_clicks: 0`
/// - **Error (400)**: `limit` out of range or not an integer. The check runs
///   after authentication, so a username is resolved (and created) first.
pub async fn top_urls(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<TopUrlsQuery>,
) -> Result<Json<Vec<UrlStats>>, AppError> {
    let limit = params.limit()?;
    let stats = analytics_service::top_urls(&state.pool, principal.user_id, limit).await?;

    Ok(Json(stats))
}

/// Get clicks per day for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/analytics/time-series?days=7&fill_gaps=false`
///
/// # Query Parameters
///
/// - `days` - 1 to 90, defaults to 7; the window ends today (UTC)
/// - `fill_gaps` - include zero-click dates, defaults to false
///
/// Out-of-range or malformed values give 400 `invalid_request`. As with
/// `top-urls`, this happens after the username has been resolved.
///
/// # Response
///
/// ```json
/// [
///   { "date": "2025-12-19", "clicks": 2 },
///   { "date": "2025-12-20", "clicks": 5 }
/// ]
/// ```
pub async fn time_series(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<TimeSeriesQuery>,
) -> Result<Json<Vec<TimeSeriesPoint>>, AppError> {
    let days = params.days()?;
    let today = Utc::now().date_naive();
    let points = analytics_service::time_series(
        &state.pool,
        principal.user_id,
        today,
        days,
        params.fill_gaps,
    )
    .await?;

    Ok(Json(points))
}

/// Get detailed analytics for one URL.
///
/// # Endpoint
///
/// `GET /api/analytics/url/{url_id}`
///
/// # Response
///
/// - **Success (200 OK)**: `{ "url": {...}, "total_clicks": 7, "recent_clicks": [...] }`
///   with at most 50 clicks, newest first
/// - **Error (400)**: `url_id` is not an integer (checked after authentication)
/// - **Error (404)**: URL does not exist or is owned by another user
pub async fn url_analytics(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(url_id): ApiPath<i32>,
) -> Result<Json<UrlAnalytics>, AppError> {
    let detail = analytics_service::url_analytics(&state.pool, url_id, principal.user_id).await?;

    Ok(Json(detail))
}
