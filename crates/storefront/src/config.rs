//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `FRESHCART_API_URL` - Cart service base URL (default: <http://127.0.0.1:8000/>)
//! - `FRESHCART_STORAGE_DIR` - Directory for the persisted cart and session (default: .freshcart)
//! - `FRESHCART_TOAST_MS` - Notification lifetime in milliseconds (default: 2000)
//! - `FRESHCART_CATALOG_LIMIT` - Maximum products to request (default: server decides)
//! - `FRESHCART_CATALOG_CACHE_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";
const DEFAULT_STORAGE_DIR: &str = ".freshcart";
const DEFAULT_TOAST_MS: &str = "2000";
const DEFAULT_CATALOG_CACHE_SECS: &str = "300";
const DEFAULT_CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Cart service configuration
    pub api: ApiConfig,
    /// Directory holding the persisted cart and session id
    pub storage_dir: PathBuf,
    /// How long notifications stay visible
    pub toast_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Cart service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// `limit` sent with catalog requests
    pub catalog_limit: Option<u32>,
    /// How long a successful catalog listing is reused
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Configuration for a service at `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("FRESHCART_API_URL", base_url)?,
            catalog_limit: None,
            catalog_cache_ttl: DEFAULT_CATALOG_CACHE_TTL,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = parse_base_url(
            "FRESHCART_API_URL",
            &env.get_env_or_default("FRESHCART_API_URL", DEFAULT_API_URL),
        )?;
        let catalog_limit = env
            .get_optional_env("FRESHCART_CATALOG_LIMIT")
            .map(|value| parse_var::<u32>("FRESHCART_CATALOG_LIMIT", &value))
            .transpose()?;
        let cache_secs = parse_var::<u64>(
            "FRESHCART_CATALOG_CACHE_SECS",
            &env.get_env_or_default("FRESHCART_CATALOG_CACHE_SECS", DEFAULT_CATALOG_CACHE_SECS),
        )?;
        let toast_ms = parse_var::<u64>(
            "FRESHCART_TOAST_MS",
            &env.get_env_or_default("FRESHCART_TOAST_MS", DEFAULT_TOAST_MS),
        )?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_limit,
                catalog_cache_ttl: Duration::from_secs(cache_secs),
            },
            storage_dir: PathBuf::from(
                env.get_env_or_default("FRESHCART_STORAGE_DIR", DEFAULT_STORAGE_DIR),
            ),
            toast_ttl: Duration::from_millis(toast_ms),
            sentry_dsn: env.get_optional_env("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Blank values count as unset.
    fn get_optional_env(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn get_env_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional_env(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL, appending the trailing slash `Url::join` needs.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
