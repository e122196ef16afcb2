//! Business logic services.
//!
//! Services hold the SQL behind each endpoint, separated from HTTP handlers.
//! Each operation runs inside one unit of work taken from the pool.

pub mod analytics_service;
pub mod date_window;
pub mod principal;
