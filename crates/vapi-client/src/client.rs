//! Registry HTTP client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::VapiConfig;
use crate::error::VapiError;
use crate::registry::AssistantRegistry;
use crate::types::{decode_list, NewRemoteAssistant, RemoteAssistant};

/// Client for the Vapi assistant API.
#[derive(Clone)]
pub struct VapiClient {
    http: Client,
    config: VapiConfig,
}

impl VapiClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: VapiConfig) -> Result<Self, VapiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VapiError::Http)?;

        info!(base_url = %config.base_url, "Assistant registry client ready");
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &VapiConfig {
        &self.config
    }

    /// List assistants, surfacing errors.
    pub async fn try_list(&self) -> Result<Vec<RemoteAssistant>, VapiError> {
        let url = self.config.assistants_url();
        debug!("Listing assistants: {}", url);

        let body = self.send_json(self.http.get(&url)).await?;
        let (assistants, skipped) = decode_list(body);
        if skipped > 0 {
            warn!(skipped, "Some registry assistants could not be decoded");
        }
        Ok(assistants)
    }

    /// Fetch one assistant, surfacing errors. A 404 is `Ok(None)`.
    pub async fn try_get(&self, id: &str) -> Result<Option<RemoteAssistant>, VapiError> {
        let url = self.config.assistant_url(id);
        match self.send_json(self.http.get(&url)).await {
            Ok(body) => Ok(Some(RemoteAssistant::from_json(body)?)),
            Err(VapiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create an assistant, surfacing errors.
    pub async fn try_create(
        &self,
        assistant: &NewRemoteAssistant,
    ) -> Result<RemoteAssistant, VapiError> {
        let url = self.config.assistants_url();
        let body = self
            .send_json(self.http.post(&url).json(&assistant.to_json()))
            .await?;
        Ok(RemoteAssistant::from_json(body)?)
    }

    /// Delete an assistant, surfacing errors.
    pub async fn try_delete(&self, id: &str) -> Result<(), VapiError> {
        let url = self.config.assistant_url(id);
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, VapiError> {
        let response = request
            .bearer_auth(self.config.api_key())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VapiError::Timeout(self.config.timeout)
                } else {
                    VapiError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VapiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, VapiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                VapiError::Timeout(self.config.timeout)
            } else {
                VapiError::Http(e)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl AssistantRegistry for VapiClient {
    async fn list(&self) -> Vec<RemoteAssistant> {
        match self.try_list().await {
            Ok(assistants) => assistants,
            Err(e) => {
                warn!(error = %e, "Failed to list registry assistants");
                Vec::new()
            }
        }
    }

    async fn get(&self, id: &str) -> Option<RemoteAssistant> {
        match self.try_get(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(assistant_id = %id, error = %e, "Failed to fetch registry assistant");
                None
            }
        }
    }

    async fn create(&self, assistant: &NewRemoteAssistant) -> Option<RemoteAssistant> {
        match self.try_create(assistant).await {
            Ok(created) => {
                info!(assistant_id = %created.id, name = %created.name, "Registry assistant created");
                Some(created)
            }
            Err(e) => {
                warn!(name = %assistant.name, error = %e, "Failed to create registry assistant");
                None
            }
        }
    }

    async fn delete(&self, id: &str) -> bool {
        match self.try_delete(id).await {
            Ok(()) => {
                info!(assistant_id = %id, "Registry assistant deleted");
                true
            }
            Err(e) => {
                warn!(assistant_id = %id, error = %e, "Failed to delete registry assistant");
                false
            }
        }
    }
}

impl std::fmt::Debug for VapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapiClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
