//! Authentication middleware.
//!
//! This middleware intercepts every analytics request to:
//! 1. Pick the credential the configured auth mode accepts
//!    (`Authorization: Bearer` header, `api_key` or `username` query parameter)
//! 2. Resolve it to a user id, creating the user in username mode
//! 3. Inject the `Principal` into the request
//! 4. Reject unauthenticated requests with HTTP 401

use crate::{
    AppState,
    error::AppError,
    extract::ApiQuery,
    services::principal::{self, Credential, CredentialQuery},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// Authentication middleware function.
///
/// # Flow
///
/// 1. Read an optional bearer token and the credential query parameters
/// 2. Select one credential according to `AuthMode`
/// 3. Resolve it against the `users` table
/// 4. If resolved: inject `Principal` into request, call next handler
/// 5. Otherwise: 401 for a bad or missing credential, 500 for a backend failure
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::InvalidApiKey | AppError::MissingCredentials)` (401)
/// - `Err(AppError::Database | AppError::UserResolution)` (500)
pub async fn auth_middleware(
    State(state): State<AppState>,
    ApiQuery(credentials): ApiQuery<CredentialQuery>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = if state.auth_mode.accepts_api_key() {
        bearer_token(request.headers())?
    } else {
        None
    };

    let credential = Credential::select(state.auth_mode, bearer, credentials)?;
    let principal = principal::resolve(&state.pool, credential).await?;

    tracing::debug!(
        user_id = principal.user_id,
        method = ?principal.method,
        "request authenticated"
    );

    // Route handlers can now extract this using Extension<Principal>
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <key>` header.
///
/// A missing header is `Ok(None)`; a header in any other scheme is rejected.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(AppError::InvalidApiKey)
}
