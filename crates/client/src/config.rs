//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SPARKLAB_API_URL` - Storefront base URL (default: <http://127.0.0.1:3000>)
//! - `SPARKLAB_DATA_DIR` - Directory for persisted cart and wishlist (default: `.sparklab`)
//! - `SPARKLAB_SYNC_DEBOUNCE_MS` - Quiet period before a change is pushed (default: 1000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = ".sparklab";
const DEFAULT_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Sync timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Changes are pushed once this long passes without another change.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub data_dir: PathBuf,
    pub sync: SyncConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("SPARKLAB_API_URL", DEFAULT_API_URL))?;
        let data_dir = PathBuf::from(get_env_or_default("SPARKLAB_DATA_DIR", DEFAULT_DATA_DIR));
        let debounce = parse_debounce(get_optional_env("SPARKLAB_SYNC_DEBOUNCE_MS").as_deref())?;

        Ok(Self {
            api_url,
            data_dir,
            sync: SyncConfig { debounce },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SPARKLAB_API_URL".to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            "SPARKLAB_API_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

fn parse_debounce(raw: Option<&str>) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_millis(DEFAULT_DEBOUNCE_MS));
    };
    let millis = raw.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("SPARKLAB_SYNC_DEBOUNCE_MS".to_string(), e.to_string())
    })?;
    Ok(Duration::from_millis(millis))
}
