//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPFRONT_DATA_DIR` - Directory holding the local storage file (default: .shopfront)
//! - `SHOPFRONT_TOKEN_TTL_HOURS` - Credential lifetime in hours (default: 24)
//! - `SHOPFRONT_LOGIN_LATENCY_MS` - Simulated login latency (default: 500)
//! - `SHOPFRONT_REGISTER_LATENCY_MS` - Simulated registration latency (default: 800)
//! - `SHOPFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use thiserror::Error;

/// Name of the store file inside the data directory.
pub const STORE_FILE_NAME: &str = "local_storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct ShopfrontConfig {
    /// Directory holding the local storage file
    pub data_dir: PathBuf,
    /// Account directory behaviour
    pub accounts: AccountSettings,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Settings for the mock account directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSettings {
    /// Lifetime of issued credentials
    pub token_ttl: TimeDelta,
    /// Simulated network delay before a login resolves
    pub login_latency: Duration,
    /// Simulated network delay before a registration resolves
    pub register_latency: Duration,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            token_ttl: TimeDelta::hours(24),
            login_latency: Duration::from_millis(500),
            register_latency: Duration::from_millis(800),
        }
    }
}

impl AccountSettings {
    /// Settings with no simulated latency, for tests and scripting.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            login_latency: Duration::ZERO,
            register_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for ShopfrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".shopfront"),
            accounts: AccountSettings::default(),
            log_format: LogFormat::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ShopfrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let data_dir = get_optional_env("SHOPFRONT_DATA_DIR")
            .map_or(defaults.data_dir, PathBuf::from);

        let ttl_hours: i64 = get_parsed_env("SHOPFRONT_TOKEN_TTL_HOURS", 24)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_TOKEN_TTL_HOURS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let token_ttl = TimeDelta::try_hours(ttl_hours).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SHOPFRONT_TOKEN_TTL_HOURS".to_string(),
                "out of range".to_string(),
            )
        })?;

        let accounts = AccountSettings {
            token_ttl,
            login_latency: Duration::from_millis(get_parsed_env("SHOPFRONT_LOGIN_LATENCY_MS", 500)?),
            register_latency: Duration::from_millis(get_parsed_env(
                "SHOPFRONT_REGISTER_LATENCY_MS",
                800,
            )?),
        };

        let log_format = get_parsed_env("SHOPFRONT_LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            data_dir,
            accounts,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the local storage file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-blank environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional environment variable, falling back to `default`.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
