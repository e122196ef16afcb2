//! Data models representing database entities and analytics responses.

/// Analytics response shapes (summary, top URLs, time series, URL detail)
pub mod analytics;
/// Click event model
pub mod click;
/// Short URL model
pub mod url;
