//! Dispatch configuration and stored call settings.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Model used when nothing else specifies one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Voice used when nothing else specifies one.
pub const DEFAULT_VOICE: &str = "jennifer";
/// Call language used when nothing else specifies one.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";
/// Provider names sent when publishing an assistant.
pub const DEFAULT_MODEL_PROVIDER: &str = "openai";
pub const DEFAULT_VOICE_PROVIDER: &str = "playht";
/// Last-resort assistant, used only while it still exists remotely.
pub const DEFAULT_FALLBACK_ASSISTANT_ID: &str = "d1f3c8a2-6b4e-4f0a-9c7d-2e5b8a1f4c60";
/// Path appended to the automation base URL.
pub const WEBHOOK_PATH: &str = "/webhook/collowop";
/// Timeout for the automation webhook.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(8);

/// Locally stored call settings, the third tier of config precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSettings {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
}

impl CallSettings {
    /// Read `DEFAULT_MODEL`, `DEFAULT_VOICE` and `DEFAULT_LANGUAGE`.
    pub fn from_env() -> Self {
        let read = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            model: read("DEFAULT_MODEL"),
            voice: read("DEFAULT_VOICE"),
            language: read("DEFAULT_LANGUAGE"),
        }
    }
}

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Automation platform base URL (e.g., "https://n8n.example.com").
    pub automation_base_url: String,
    /// Fallback registry assistant ID.
    pub fallback_assistant_id: String,
    /// Stored call settings.
    pub settings: CallSettings,
    /// Webhook timeout.
    pub webhook_timeout: Duration,
}

impl DispatchConfig {
    pub fn new(automation_base_url: impl Into<String>) -> Self {
        Self {
            automation_base_url: automation_base_url.into().trim_end_matches('/').to_string(),
            fallback_assistant_id: DEFAULT_FALLBACK_ASSISTANT_ID.to_string(),
            settings: CallSettings::default(),
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }

    pub fn with_fallback_assistant_id(mut self, id: impl Into<String>) -> Self {
        self.fallback_assistant_id = id.into();
        self
    }

    pub fn with_settings(mut self, settings: CallSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `AUTOMATION_BASE_URL` - Base URL of the automation platform
    ///
    /// Optional:
    /// - `FALLBACK_ASSISTANT_ID` - Default: built-in ID
    /// - `HTTP_TIMEOUT_SECS` - Default: 8
    /// - `DEFAULT_MODEL`, `DEFAULT_VOICE`, `DEFAULT_LANGUAGE` - Stored call settings
    pub fn from_env() -> Result<Self, DispatchError> {
        let base = env::var("AUTOMATION_BASE_URL")
            .map_err(|_| DispatchError::Config("AUTOMATION_BASE_URL is required".to_string()))?;

        let mut config = Self::new(base).with_settings(CallSettings::from_env());

        if let Ok(id) = env::var("FALLBACK_ASSISTANT_ID") {
            if !id.trim().is_empty() {
                config.fallback_assistant_id = id.trim().to_string();
            }
        }

        if let Ok(raw) = env::var("HTTP_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| DispatchError::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?;
            config.webhook_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Full webhook endpoint.
    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.automation_base_url, WEBHOOK_PATH)
    }
}
