//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `PORT` (optional): HTTP server port, defaults to 7544
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (optional): seconds to wait for a pooled connection, defaults to 5
/// - `REQUEST_TIMEOUT_SECS` (optional): per-request deadline, defaults to 30
/// - `AUTH_MODE` (optional): `username`, `api_key` or `both`, defaults to `both`
/// - `RUN_MIGRATIONS` (optional): apply the bundled migrations at startup, defaults to false
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub database_acquire_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub auth_mode: AuthMode,

    /// The schema belongs to the ingestion side, so this is off unless asked for.
    #[serde(default)]
    pub run_migrations: bool,
}

/// Which credentials the auth gate accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum AuthMode {
    /// `username` query parameter only; unknown users are created on first sight.
    Username,
    /// API key only (`Authorization: Bearer` header or `api_key` query parameter).
    ApiKey,
    /// Either credential; an API key wins when both are supplied.
    #[default]
    Both,
}

impl AuthMode {
    pub fn accepts_username(self) -> bool {
        matches!(self, AuthMode::Username | AuthMode::Both)
    }

    pub fn accepts_api_key(self) -> bool {
        matches!(self, AuthMode::ApiKey | AuthMode::Both)
    }
}

impl TryFrom<String> for AuthMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "username" => Ok(AuthMode::Username),
            "api_key" | "apikey" | "api-key" => Ok(AuthMode::ApiKey),
            "both" => Ok(AuthMode::Both),
            other => Err(format!(
                "unknown AUTH_MODE `{other}`, expected one of: username, api_key, both"
            )),
        }
    }
}

/// Default port if PORT environment variable is not set.
fn default_port() -> u16 {
    7544
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database_acquire_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config: Config =
            envy::from_iter(vars(&[("DATABASE_URL", "postgres://localhost/analytics")])).unwrap();

        assert_eq!(config.port, 7544);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.auth_mode, AuthMode::Both);
        assert!(!config.run_migrations);
    }

    #[test]
    fn reads_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/analytics"),
            ("PORT", "8080"),
            ("AUTH_MODE", "api_key"),
            ("RUN_MIGRATIONS", "true"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.auth_mode, AuthMode::ApiKey);
        assert!(config.run_migrations);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(envy::from_iter::<_, Config>(vars(&[("PORT", "8080")])).is_err());
    }

    #[test]
    fn rejects_unknown_auth_mode() {
        let result = envy::from_iter::<_, Config>(vars(&[
            ("DATABASE_URL", "postgres://localhost/analytics"),
            ("AUTH_MODE", "oauth"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn auth_mode_acceptance() {
        assert!(AuthMode::Username.accepts_username());
        assert!(!AuthMode::Username.accepts_api_key());
        assert!(AuthMode::ApiKey.accepts_api_key());
        assert!(!AuthMode::ApiKey.accepts_username());
        assert!(AuthMode::Both.accepts_username() && AuthMode::Both.accepts_api_key());
    }
}
