//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use dispatch::sync_loop::{clamp_interval, DEFAULT_SYNC_INTERVAL};
use dispatch::{DispatchConfig, DispatchError};
use vapi_client::{VapiConfig, VapiError};

/// Dashboard server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Assistant registry connection.
    pub vapi: VapiConfig,
    /// Automation webhook and call defaults.
    pub dispatch: DispatchConfig,
    /// Interval between background sync passes.
    pub sync_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DASHBOARD_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:collowop.db?mode=rwc` |
    /// | `VAPI_API_URL` | Assistant registry URL | `https://api.vapi.ai` |
    /// | `VAPI_API_KEY` | Registry bearer token | (required) |
    /// | `AUTOMATION_BASE_URL` | Automation platform URL | (required) |
    /// | `FALLBACK_ASSISTANT_ID` | Last-resort assistant | built-in ID |
    /// | `SYNC_INTERVAL_SECS` | Sync interval, clamped to 5-30 | `15` |
    /// | `HTTP_TIMEOUT_SECS` | Outbound HTTP timeout | `8` |
    /// | `DEFAULT_MODEL` / `DEFAULT_VOICE` / `DEFAULT_LANGUAGE` | Stored call settings | unset |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("DASHBOARD_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:collowop.db?mode=rwc".to_string());

        let sync_interval = match env::var("SYNC_INTERVAL_SECS") {
            Ok(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSyncInterval(raw.clone()))?;
                clamp_interval(Duration::from_secs(secs))
            }
            Err(_) => DEFAULT_SYNC_INTERVAL,
        };

        Ok(Self {
            addr,
            database_url,
            vapi: VapiConfig::from_env()?,
            dispatch: DispatchConfig::from_env()?,
            sync_interval,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DASHBOARD_ADDR format")]
    InvalidAddr,

    #[error("Invalid SYNC_INTERVAL_SECS: {0}")]
    InvalidSyncInterval(String),

    #[error("Registry configuration: {0}")]
    Vapi(#[from] VapiError),

    #[error("Dispatch configuration: {0}")]
    Dispatch(#[from] DispatchError),
}
