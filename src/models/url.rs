//! Short URL model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a row of the `urls` table.
///
/// URLs are written by the ingestion side; this service only reads them and
/// always filters by `user_id` so one tenant never sees another's links.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Url {
    pub id: i32,

    pub short_code: String,

    pub long_url: String,

    /// Page title fetched by the metadata worker, if it has run
    pub title: Option<String>,

    pub description: Option<String>,

    /// Owning user
    pub user_id: i32,

    /// Inactive links stop redirecting but keep their click history
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}
