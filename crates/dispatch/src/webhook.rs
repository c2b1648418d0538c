//! Automation webhook transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DispatchConfig;

/// Result of one webhook POST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookDelivery {
    /// HTTP status, when a response arrived.
    pub status_code: Option<u16>,
    /// Transport error or non-2xx description.
    pub error: Option<String>,
}

impl WebhookDelivery {
    /// A 2xx response.
    pub fn ok(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            error: None,
        }
    }

    /// Whether the automation platform accepted the payload.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }
}

/// Trait for delivering dispatch payloads.
///
/// Abstracted so dispatch can run against the real platform or an
/// in-memory recorder in tests. Delivery never fails with an error; failures are
/// described in the returned [`WebhookDelivery`].
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// POST one payload.
    async fn deliver(&self, payload: &Value) -> WebhookDelivery;
}

/// Delivers payloads over HTTP to the automation platform.
#[derive(Debug, Clone)]
pub struct HttpWebhookSink {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpWebhookSink {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.webhook_url(),
            timeout: config.webhook_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn deliver(&self, payload: &Value) -> WebhookDelivery {
        debug!(url = %self.url, "Posting automation webhook");

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    WebhookDelivery::ok(status.as_u16())
                } else {
                    let body = response.text().await.unwrap_or_default();
                    warn!(status = status.as_u16(), body = %body, "Automation webhook rejected payload");
                    WebhookDelivery {
                        status_code: Some(status.as_u16()),
                        error: Some(format!("webhook returned {}", status)),
                    }
                }
            }
            Err(err) if err.is_timeout() => {
                warn!(timeout = ?self.timeout, "Automation webhook timed out");
                WebhookDelivery {
                    status_code: None,
                    error: Some(format!("webhook timed out after {:?}", self.timeout)),
                }
            }
            Err(err) => {
                warn!(error = %err, "Automation webhook request failed");
                WebhookDelivery {
                    status_code: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
