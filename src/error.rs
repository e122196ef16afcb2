//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Authentication Errors**: unknown API key, or no usable credential
/// - **Resource Errors**: requested URL not found for the caller
/// - **Validation Errors**: out-of-range or malformed parameters
/// - **Backend Errors**: connectivity or SQL failures, including user resolution
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Looking up or creating the user behind a username failed.
    ///
    /// Kept apart from `Database` so logs say which stage broke; the client
    /// sees the same generic 500.
    #[error("Failed to resolve user: {0}")]
    UserResolution(#[source] sqlx::Error),

    /// API key does not belong to any user.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The request carries no credential the configured auth mode accepts.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing credentials")]
    MissingCredentials,

    /// URL does not exist or belongs to another user.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("URL not found")]
    UrlNotFound,

    /// Request parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidApiKey | AppError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AppError::UrlNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::UserResolution(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Backend failures are logged in full and reported to the client with a
/// generic message only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (code, message) = match self {
            AppError::InvalidApiKey => ("invalid_api_key", self.to_string()),
            AppError::MissingCredentials => ("missing_credentials", self.to_string()),
            AppError::UrlNotFound => ("url_not_found", self.to_string()),
            AppError::InvalidRequest(ref msg) => ("invalid_request", msg.clone()),
            AppError::UserResolution(ref err) => {
                tracing::error!(error = %err, "failed to resolve user");
                ("internal_error", "Failed to resolve user".to_string())
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
