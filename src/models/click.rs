//! Click event model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single redirect recorded against a URL. Append-only.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Click {
    pub id: i32,

    pub url_id: i32,

    pub ip_address: String,

    pub user_agent: Option<String>,

    pub referer: Option<String>,

    pub country: Option<String>,

    pub city: Option<String>,

    pub clicked_at: DateTime<Utc>,
}
