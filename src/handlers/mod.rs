//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives request data (query string, URL params, resolved principal)
//! 2. Calls the matching service query
//! 3. Returns HTTP response (JSON, status code)

/// Analytics endpoints
pub mod analytics;
/// Liveness and database health
pub mod health;
