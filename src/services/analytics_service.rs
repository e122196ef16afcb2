//! Analytics service - aggregate and detail queries over a user's clicks.
//!
//! Every query joins through `urls.user_id`, so a caller only ever counts
//! clicks on links they own. Each operation runs inside one read-only unit of
//! work; day boundaries are UTC midnights computed by `DateWindow`.

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::{
        analytics::{AnalyticsSummary, RECENT_CLICKS_LIMIT, TimeSeriesPoint, UrlAnalytics, UrlStats},
        click::Click,
        url::Url,
    },
    services::date_window::DateWindow,
};
use chrono::NaiveDate;

/// The week window runs from `today - 7 days` at 00:00 UTC, both ends inclusive.
const WEEK_DAYS_BACK: u64 = 7;

/// Overall counts for one user.
///
/// # Queries
///
/// Four independent aggregates, all read from the REPEATABLE READ snapshot
/// of one read-only unit of work:
/// 1. URLs owned
/// 2. Clicks on owned URLs, all time
/// 3. Clicks dated today (UTC)
/// 4. Clicks since midnight seven days before the start of today
#[tracing::instrument(skip(pool))]
pub async fn summary(
    pool: &DbPool,
    user_id: i32,
    today: NaiveDate,
) -> Result<AnalyticsSummary, AppError> {
    let day = DateWindow::trailing(today, 1);
    let week = DateWindow::reaching_back(today, WEEK_DAYS_BACK);

    let mut tx = db::begin_read_only(pool).await?;

    let total_urls: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    let total_clicks: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM clicks c
        JOIN urls u ON c.url_id = u.id
        WHERE u.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let clicks_today = count_clicks_between(&mut tx, user_id, day).await?;
    let clicks_this_week = count_clicks_between(&mut tx, user_id, week).await?;

    tx.commit().await?;

    Ok(AnalyticsSummary {
        total_urls,
        total_clicks,
        clicks_today,
        clicks_this_week,
    })
}

async fn count_clicks_between(
    tx: &mut db::UnitOfWork,
    user_id: i32,
    window: DateWindow,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM clicks c
        JOIN urls u ON c.url_id = u.id
        WHERE u.user_id = $1
          AND c.clicked_at >= $2
          AND c.clicked_at < $3
        "#,
    )
    .bind(user_id)
    .bind(window.start())
    .bind(window.end())
    .fetch_one(&mut **tx)
    .await
}

/// The user's URLs ranked by lifetime clicks.
///
/// The LEFT JOIN keeps URLs that were never clicked (`total_clicks = 0`).
/// Equal counts are ordered by URL id so the ranking is stable across calls.
#[tracing::instrument(skip(pool))]
pub async fn top_urls(pool: &DbPool, user_id: i32, limit: i64) -> Result<Vec<UrlStats>, AppError> {
    let mut tx = db::begin_read_only(pool).await?;

    let stats = sqlx::query_as::<_, UrlStats>(
        r#"
        SELECT
            u.id AS url_id,
            u.short_code,
            u.long_url,
            u.title,
            u.created_at,
            COUNT(c.id) AS total_clicks
        FROM urls u
        LEFT JOIN clicks c ON c.url_id = u.id
        WHERE u.user_id = $1
        GROUP BY u.id
        ORDER BY total_clicks DESC, u.id ASC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(stats)
}

/// Clicks per UTC date over the `days` dates ending today, ascending.
///
/// Dates without clicks are omitted unless `fill_gaps` is set, in which case
/// every date of the window is present.
#[tracing::instrument(skip(pool))]
pub async fn time_series(
    pool: &DbPool,
    user_id: i32,
    today: NaiveDate,
    days: i64,
    fill_gaps: bool,
) -> Result<Vec<TimeSeriesPoint>, AppError> {
    let window = DateWindow::trailing(today, days);

    let mut tx = db::begin_read_only(pool).await?;

    let points = sqlx::query_as::<_, TimeSeriesPoint>(
        r#"
        SELECT
            (c.clicked_at AT TIME ZONE 'UTC')::date AS date,
            COUNT(*) AS clicks
        FROM clicks c
        JOIN urls u ON c.url_id = u.id
        WHERE u.user_id = $1
          AND c.clicked_at >= $2
          AND c.clicked_at < $3
        GROUP BY 1
        ORDER BY 1 ASC
        "#,
    )
    .bind(user_id)
    .bind(window.start())
    .bind(window.end())
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    if fill_gaps {
        Ok(window.fill_gaps(points))
    } else {
        Ok(points)
    }
}

/// Detail view of one URL: the record, its click total and latest clicks.
///
/// # Security Note
///
/// Ownership is checked first by filtering on BOTH `id` AND `user_id`. A URL
/// that exists but belongs to someone else is indistinguishable from one that
/// does not exist.
///
/// # Errors
///
/// - `UrlNotFound`: no URL with this id owned by `user_id`
/// - `Database`: database error occurred
#[tracing::instrument(skip(pool))]
pub async fn url_analytics(
    pool: &DbPool,
    url_id: i32,
    user_id: i32,
) -> Result<UrlAnalytics, AppError> {
    let mut tx = db::begin_read_only(pool).await?;

    let url = sqlx::query_as::<_, Url>(
        r#"
        SELECT id, short_code, long_url, title, description, user_id, is_active, created_at
        FROM urls
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(url_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    // Returning drops `tx`, which rolls it back.
    let Some(url) = url else {
        return Err(AppError::UrlNotFound);
    };

    let total_clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE url_id = $1")
        .bind(url.id)
        .fetch_one(&mut *tx)
        .await?;

    let recent_clicks = sqlx::query_as::<_, Click>(
        r#"
        SELECT id, url_id, ip_address, user_agent, referer, country, city, clicked_at
        FROM clicks
        WHERE url_id = $1
        ORDER BY clicked_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(url.id)
    .bind(RECENT_CLICKS_LIMIT)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(UrlAnalytics {
        url,
        total_clicks,
        recent_clicks,
    })
}
