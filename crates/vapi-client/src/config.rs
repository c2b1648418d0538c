//! Configuration types for vapi-client.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::VapiError;

/// Default registry base URL.
pub const DEFAULT_API_URL: &str = "https://api.vapi.ai";

/// Timeout applied to every registry call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for connecting to the assistant registry.
#[derive(Debug, Clone)]
pub struct VapiConfig {
    /// Base URL of the API (e.g., "https://api.vapi.ai").
    pub base_url: String,
    /// Bearer token.
    api_key: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl VapiConfig {
    /// Create a new configuration with the given base URL and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `VAPI_API_KEY` - Bearer token for the registry
    ///
    /// Optional (with defaults):
    /// - `VAPI_API_URL` - Default: https://api.vapi.ai
    /// - `HTTP_TIMEOUT_SECS` - Default: 8
    pub fn from_env() -> Result<Self, VapiError> {
        let base_url = env::var("VAPI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_key = env::var("VAPI_API_KEY")
            .map_err(|_| VapiError::Config("VAPI_API_KEY is required".to_string()))?;

        let timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                VapiError::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", e))
            })?),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(base_url, api_key).with_timeout(timeout))
    }

    /// Bearer token, for the Authorization header.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Collection endpoint: `{base}/assistant`.
    pub fn assistants_url(&self) -> String {
        format!("{}/assistant", self.base_url)
    }

    /// Item endpoint: `{base}/assistant/{id}`.
    pub fn assistant_url(&self, id: &str) -> String {
        format!("{}/assistant/{}", self.base_url, urlencoding::encode(id))
    }
}
