//! Analytics query parameters and response types.
//!
//! This module defines:
//! - `TopUrlsQuery` / `TimeSeriesQuery`: query-string parameters with their bounds
//! - `AnalyticsSummary`, `UrlStats`, `TimeSeriesPoint`, `UrlAnalytics`: response bodies

use super::{click::Click, url::Url};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_URLS_LIMIT: i64 = 10;
pub const MAX_TOP_URLS_LIMIT: i64 = 100;

pub const DEFAULT_TIME_SERIES_DAYS: i64 = 7;
pub const MAX_TIME_SERIES_DAYS: i64 = 90;

/// Number of clicks returned with a URL's detail view.
pub const RECENT_CLICKS_LIMIT: i64 = 50;

/// Query parameters for `GET /api/analytics/top-urls`.
#[derive(Debug, Default, Deserialize)]
pub struct TopUrlsQuery {
    /// How many URLs to return (1-100, default 10)
    pub limit: Option<i64>,
}

impl TopUrlsQuery {
    /// Resolve the effective limit, rejecting values outside 1..=100.
    pub fn limit(&self) -> Result<i64, AppError> {
        bounded("limit", self.limit, DEFAULT_TOP_URLS_LIMIT, MAX_TOP_URLS_LIMIT)
    }
}

/// Query parameters for `GET /api/analytics/time-series`.
#[derive(Debug, Default, Deserialize)]
pub struct TimeSeriesQuery {
    /// Size of the trailing window in days, today included (1-90, default 7)
    pub days: Option<i64>,

    /// Emit a zero-count row for every date in the window that had no clicks
    #[serde(default)]
    pub fill_gaps: bool,
}

impl TimeSeriesQuery {
    /// Resolve the effective window size, rejecting values outside 1..=90.
    pub fn days(&self) -> Result<i64, AppError> {
        bounded("days", self.days, DEFAULT_TIME_SERIES_DAYS, MAX_TIME_SERIES_DAYS)
    }
}

fn bounded(name: &str, value: Option<i64>, default: i64, max: i64) -> Result<i64, AppError> {
    match value {
        None => Ok(default),
        Some(v) if (1..=max).contains(&v) => Ok(v),
        Some(_) => Err(AppError::InvalidRequest(format!(
            "{name} must be between 1 and {max}"
        ))),
    }
}

/// Overall click activity for one user.
///
/// Each field comes from its own aggregate query. For non-negative data,
/// `clicks_today <= clicks_this_week <= total_clicks` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
}

/// A URL together with its lifetime click count.
///
/// # JSON Example
///
/// ```json
/// {
///   "url_id": 42,
///   "short_code": "aZ3kq",
///   "long_url": "https://example.com/article",
///   "title": "An article",
///   "total_clicks": 7,
///   "created_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UrlStats {
    pub url_id: i32,
    pub short_code: String,
    pub long_url: String,
    pub title: Option<String>,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
}

/// Click count for one UTC calendar date. Serialized as `{"date": "2025-12-20", "clicks": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub clicks: i64,
}

/// Detail view of a single owned URL.
#[derive(Debug, Clone, Serialize)]
pub struct UrlAnalytics {
    pub url: Url,
    pub total_clicks: i64,
    /// Newest first, at most `RECENT_CLICKS_LIMIT` entries
    pub recent_clicks: Vec<Click>,
}
