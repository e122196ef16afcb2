//! Principal resolution - maps an inbound credential to a user id.
//!
//! Two modes:
//! - **Username**: look the user up by exact username, creating it with an
//!   empty API key on first sight. Only backend failures can make this fail.
//! - **API key**: look the user up by exact API key. An unknown key is an
//!   authentication failure (401), never a backend failure and never a new user.

use crate::{
    config::AuthMode,
    db::{self, DbPool},
    error::AppError,
};
use serde::Deserialize;

/// Longest username the `users.username` column accepts, in characters.
pub const MAX_USERNAME_LEN: usize = 255;

/// Credential-bearing query parameters shared by every analytics endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CredentialQuery {
    pub username: Option<String>,
    pub api_key: Option<String>,
}

/// The credential a request will be authenticated with.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Username(String),
    ApiKey(String),
}

// Keys stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Username(name) => f.debug_tuple("Username").field(name).finish(),
            Credential::ApiKey(_) => f.write_str("ApiKey(..)"),
        }
    }
}

impl Credential {
    /// Pick the credential to use under `mode`.
    ///
    /// An API key (bearer header first, then `api_key` parameter) takes
    /// precedence over a username when the mode accepts both.
    ///
    /// # Errors
    ///
    /// `MissingCredentials` if nothing the mode accepts was supplied.
    pub fn select(
        mode: AuthMode,
        bearer: Option<&str>,
        query: CredentialQuery,
    ) -> Result<Self, AppError> {
        if mode.accepts_api_key() {
            if let Some(key) = bearer.map(str::to_owned).or(query.api_key) {
                return Ok(Credential::ApiKey(key));
            }
        }

        if mode.accepts_username() {
            if let Some(username) = query.username {
                return Ok(Credential::Username(username));
            }
        }

        Err(AppError::MissingCredentials)
    }
}

/// How a principal was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Username,
    ApiKey,
}

/// The resolved identity behind a request.
///
/// Inserted into request extensions by the auth middleware; handlers use
/// `user_id` as the tenant filter for every query.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i32,
    pub method: AuthMethod,
}

/// Resolve a credential to a principal.
pub async fn resolve(pool: &DbPool, credential: Credential) -> Result<Principal, AppError> {
    match credential {
        Credential::Username(username) => Ok(Principal {
            user_id: get_or_create_user(pool, &username).await?,
            method: AuthMethod::Username,
        }),
        Credential::ApiKey(key) => Ok(Principal {
            user_id: resolve_api_key(pool, &key).await?,
            method: AuthMethod::ApiKey,
        }),
    }
}

/// Reject usernames that could never have been meant.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "username must not be empty".to_string(),
        ));
    }
    // VARCHAR(255) counts characters, not bytes.
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Get the id of the user called `username`, creating the user if needed.
///
/// # Process
///
/// 1. Start a unit of work
/// 2. Return the existing id if the username is known
/// 3. Otherwise insert with an empty API key; if a concurrent request won
///    the insert, read back its row instead
/// 4. Commit (an early error drops the unit of work and rolls back)
///
/// # Errors
///
/// - `InvalidRequest`: empty or oversized username
/// - `UserResolution`: any database failure
#[tracing::instrument(skip(pool))]
pub async fn get_or_create_user(pool: &DbPool, username: &str) -> Result<i32, AppError> {
    validate_username(username)?;

    find_or_insert_user(pool, username)
        .await
        .map_err(AppError::UserResolution)
}

async fn find_or_insert_user(pool: &DbPool, username: &str) -> Result<i32, sqlx::Error> {
    let mut tx = db::begin(pool).await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

    if let Some(user_id) = existing {
        tx.commit().await?;
        return Ok(user_id);
    }

    let inserted: Option<i32> = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, api_key)
        VALUES ($1, '')
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *tx)
    .await?;

    let user_id = match inserted {
        Some(user_id) => {
            tracing::info!(user_id, "created user on first lookup");
            user_id
        }
        // Lost the race to a concurrent first lookup; its row is committed by now.
        None => {
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(&mut *tx)
                .await?
        }
    };

    tx.commit().await?;

    Ok(user_id)
}

/// Get the id of the user owning `api_key`.
///
/// # Errors
///
/// - `InvalidApiKey`: the key is empty or belongs to no user
/// - `Database`: the lookup itself failed
#[tracing::instrument(skip_all)]
pub async fn resolve_api_key(pool: &DbPool, api_key: &str) -> Result<i32, AppError> {
    // Username-only accounts store an empty key; it must never authenticate.
    if api_key.is_empty() {
        return Err(AppError::InvalidApiKey);
    }

    sqlx::query_scalar("SELECT id FROM users WHERE api_key = $1")
        .bind(api_key)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(username: Option<&str>, api_key: Option<&str>) -> CredentialQuery {
        CredentialQuery {
            username: username.map(String::from),
            api_key: api_key.map(String::from),
        }
    }

    #[test]
    fn api_key_wins_in_both_mode() {
        let credential =
            Credential::select(AuthMode::Both, None, query(Some("alice"), Some("k-1"))).unwrap();
        assert_eq!(credential, Credential::ApiKey("k-1".into()));
    }

    #[test]
    fn bearer_header_wins_over_query_key() {
        let credential =
            Credential::select(AuthMode::ApiKey, Some("from-header"), query(None, Some("k-1")))
                .unwrap();
        assert_eq!(credential, Credential::ApiKey("from-header".into()));
    }

    #[test]
    fn falls_back_to_username() {
        let credential =
            Credential::select(AuthMode::Both, None, query(Some("alice"), None)).unwrap();
        assert_eq!(credential, Credential::Username("alice".into()));
    }

    #[test]
    fn username_mode_ignores_api_keys() {
        let result = Credential::select(AuthMode::Username, Some("k"), query(None, Some("k")));
        assert!(matches!(result, Err(AppError::MissingCredentials)));

        let credential =
            Credential::select(AuthMode::Username, Some("k"), query(Some("bob"), Some("k")))
                .unwrap();
        assert_eq!(credential, Credential::Username("bob".into()));
    }

    #[test]
    fn api_key_mode_ignores_usernames() {
        let result = Credential::select(AuthMode::ApiKey, None, query(Some("alice"), None));
        assert!(matches!(result, Err(AppError::MissingCredentials)));
    }

    #[test]
    fn nothing_supplied_is_missing_credentials() {
        let result = Credential::select(AuthMode::Both, None, CredentialQuery::default());
        assert!(matches!(result, Err(AppError::MissingCredentials)));
    }

    #[test]
    fn debug_output_redacts_api_keys() {
        let rendered = format!("{:?}", Credential::ApiKey("secret-key".into()));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn username_validation() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN)).is_ok());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn username_length_counts_characters() {
        // 255 two-byte characters fit the column even though they are 510 bytes
        let multibyte = "é".repeat(MAX_USERNAME_LEN);
        assert_eq!(multibyte.len(), MAX_USERNAME_LEN * 2);
        assert!(validate_username(&multibyte).is_ok());
        assert!(validate_username(&"é".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }
}
