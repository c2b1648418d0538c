//! Call dispatch: resolve an assistant, attach call config, post the webhook.

use std::fmt;
use std::sync::Arc;

use database::{webhook_log, Database, NewWebhookLog, WebhookDirection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use vapi_client::{AssistantRegistry, RemoteAssistant};

use crate::config::DispatchConfig;
use crate::resolve::{
    resolve_assistant, resolve_call_config, AssistantHints, CallConfig, RequestedConfig,
    ResolutionSource,
};
use crate::selection::SelectedAssistant;
use crate::webhook::WebhookSink;

/// Provider name sent with every payload.
pub const PROVIDER: &str = "vapi";

/// A request to trigger or manage a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Webhook action, e.g. `start_campaign` or `call_client`.
    pub action: String,
    pub campaign_id: i64,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    /// Registry assistant ID hint.
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Assistant name hint.
    #[serde(default)]
    pub assistant_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Extra fields forwarded under `additional_data`.
    #[serde(default)]
    pub additional_data: Map<String, Value>,
}

impl DispatchRequest {
    pub fn new(action: impl Into<String>, campaign_id: i64) -> Self {
        Self {
            action: action.into(),
            campaign_id,
            ..Self::default()
        }
    }
}

/// Body posted to the automation webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub action: String,
    pub campaign_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    pub provider: &'static str,
    pub call: CallConfig,
    pub additional_data: Map<String, Value>,
}

/// Details of a delivered dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReceipt {
    pub assistant_id: String,
    pub assistant_name: String,
    pub source: ResolutionSource,
    pub call: CallConfig,
    pub status_code: Option<u16>,
}

/// Why a dispatch did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DispatchFailure {
    /// Nothing in the registry could be used.
    NoAssistantAvailable,
    /// The automation platform did not accept the payload.
    WebhookFailed {
        assistant_id: String,
        status_code: Option<u16>,
        error: String,
    },
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchFailure::NoAssistantAvailable => f.write_str("no assistant available"),
            DispatchFailure::WebhookFailed { error, .. } => write!(f, "webhook failed: {}", error),
        }
    }
}

/// Outcome of a dispatch. Dispatch itself never returns an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent(DispatchReceipt),
    Failed(DispatchFailure),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent(_))
    }

    pub fn receipt(&self) -> Option<&DispatchReceipt> {
        match self {
            DispatchOutcome::Sent(receipt) => Some(receipt),
            DispatchOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DispatchFailure> {
        match self {
            DispatchOutcome::Sent(_) => None,
            DispatchOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Resolves assistants and posts dispatch payloads.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn AssistantRegistry>,
    sink: Arc<dyn WebhookSink>,
    config: DispatchConfig,
    log_db: Option<Database>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<dyn AssistantRegistry>,
        sink: Arc<dyn WebhookSink>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            sink,
            config,
            log_db: None,
        }
    }

    /// Record every outbound delivery in `webhook_logs`.
    pub fn with_webhook_log(mut self, database: Database) -> Self {
        self.log_db = Some(database);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<dyn AssistantRegistry> {
        &self.registry
    }

    /// Resolve an assistant for `request` and post the payload.
    ///
    /// Ownership is re-checked on every fetch: only assistants usable by
    /// `user_id` take part in resolution. `selected` is the caller's session
    /// selection, re-validated against the same filtered list.
    pub async fn dispatch(
        &self,
        user_id: &str,
        request: &DispatchRequest,
        selected: Option<&SelectedAssistant>,
    ) -> DispatchOutcome {
        let listed = self.registry.list().await;
        let listed_count = listed.len();
        let remote: Vec<RemoteAssistant> = listed
            .into_iter()
            .filter(|assistant| assistant.is_usable_by(user_id))
            .collect();
        if remote.len() < listed_count {
            debug!(
                user_id,
                skipped = listed_count - remote.len(),
                "Ignoring assistants owned by other users"
            );
        }

        let hints = AssistantHints {
            id: request.assistant_id.as_deref(),
            name: request.assistant_name.as_deref(),
        };
        let Some(resolution) =
            resolve_assistant(&remote, hints, selected, &self.config.fallback_assistant_id)
        else {
            warn!(
                campaign_id = request.campaign_id,
                action = %request.action,
                remote_count = remote.len(),
                "No assistant available for dispatch"
            );
            return DispatchOutcome::Failed(DispatchFailure::NoAssistantAvailable);
        };

        let assistant = &resolution.assistant;
        let call = resolve_call_config(
            RequestedConfig {
                model: request.model.as_deref(),
                voice: request.voice.as_deref(),
                language: request.language.as_deref(),
            },
            Some(assistant),
            &self.config.settings,
        );

        let payload = build_payload(request, &assistant.id, &assistant.name, call.clone());
        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(err) => {
                return DispatchOutcome::Failed(DispatchFailure::WebhookFailed {
                    assistant_id: assistant.id.clone(),
                    status_code: None,
                    error: format!("payload serialization failed: {}", err),
                });
            }
        };

        let delivery = self.sink.deliver(&body).await;
        self.log_delivery(request, &body, delivery.status_code, delivery.error.as_deref())
            .await;

        if delivery.is_success() {
            info!(
                campaign_id = request.campaign_id,
                action = %request.action,
                assistant_id = %assistant.id,
                source = ?resolution.source,
                "Dispatch sent"
            );
            DispatchOutcome::Sent(DispatchReceipt {
                assistant_id: assistant.id.clone(),
                assistant_name: assistant.name.clone(),
                source: resolution.source,
                call,
                status_code: delivery.status_code,
            })
        } else {
            let error = delivery
                .error
                .unwrap_or_else(|| "webhook did not accept the payload".to_string());
            warn!(
                campaign_id = request.campaign_id,
                action = %request.action,
                status = ?delivery.status_code,
                error = %error,
                "Dispatch failed"
            );
            DispatchOutcome::Failed(DispatchFailure::WebhookFailed {
                assistant_id: assistant.id.clone(),
                status_code: delivery.status_code,
                error,
            })
        }
    }

    async fn log_delivery(
        &self,
        request: &DispatchRequest,
        body: &Value,
        status_code: Option<u16>,
        error: Option<&str>,
    ) {
        let Some(db) = &self.log_db else {
            return;
        };

        let entry = NewWebhookLog {
            direction: WebhookDirection::Outbound,
            action: request.action.clone(),
            campaign_id: Some(request.campaign_id),
            payload: body.to_string(),
            status_code: status_code.map(i64::from),
            success: error.is_none() && matches!(status_code, Some(code) if (200..300).contains(&code)),
            error: error.map(str::to_string),
        };

        if let Err(err) = webhook_log::record(db.pool(), &entry).await {
            warn!(error = %err, "Failed to log outbound webhook");
        }
    }
}

fn build_payload(
    request: &DispatchRequest,
    assistant_id: &str,
    assistant_name: &str,
    call: CallConfig,
) -> WebhookPayload {
    let mut additional_data = request.additional_data.clone();
    additional_data.insert("assistant_id".to_string(), Value::from(assistant_id));
    additional_data.insert("assistant_name".to_string(), Value::from(assistant_name));

    WebhookPayload {
        action: request.action.clone(),
        campaign_id: request.campaign_id,
        client_id: request.client_id,
        client_name: request.client_name.clone(),
        client_phone: request.client_phone.clone(),
        provider: PROVIDER,
        call,
        additional_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;
    use mock_vapi::InMemoryRegistry;
    use serde_json::json;

    fn dispatcher(registry: InMemoryRegistry, sink: RecordingSink) -> Dispatcher {
        Dispatcher::new(
            Arc::new(registry),
            Arc::new(sink),
            DispatchConfig::new("https://automation.example.com"),
        )
    }

    #[tokio::test]
    async fn test_single_default_assistant_fills_payload() {
        let registry =
            InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant("asst-1", "Default", None)]);
        let sink = RecordingSink::new();
        let dispatcher = dispatcher(registry, sink.clone());

        let mut request = DispatchRequest::new("call_client", 7);
        request.client_phone = Some("+5511999999999".to_string());

        let outcome = dispatcher.dispatch("user-1", &request, None).await;
        let receipt = outcome.receipt().expect("dispatch should be sent");
        assert_eq!(receipt.assistant_name, "Default");
        assert_eq!(receipt.source, ResolutionSource::FirstAvailable);

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(payload["action"], "call_client");
        assert_eq!(payload["campaign_id"], 7);
        assert_eq!(payload["client_phone"], "+5511999999999");
        assert_eq!(payload["provider"], "vapi");
        assert_eq!(payload["additional_data"]["assistant_name"], "Default");
        assert_eq!(payload["additional_data"]["assistant_id"], "asst-1");
        assert_eq!(
            payload["call"],
            json!({"model": "gpt-4o-mini", "voice": "jennifer", "language": "pt-BR"})
        );
        assert!(payload.get("client_id").is_none());
    }

    #[tokio::test]
    async fn test_invalid_id_falls_through_to_name() {
        let registry = InMemoryRegistry::with_assistants(vec![
            InMemoryRegistry::assistant("asst-1", "Sales Bot", None),
            InMemoryRegistry::assistant("asst-2", "Support Agent", None),
        ]);
        let sink = RecordingSink::new();
        let dispatcher = dispatcher(registry, sink.clone());

        let mut request = DispatchRequest::new("start_campaign", 1);
        request.assistant_id = Some("deleted-assistant".to_string());
        request.assistant_name = Some("support".to_string());

        let outcome = dispatcher.dispatch("user-1", &request, None).await;
        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.assistant_id, "asst-2");
        assert_eq!(receipt.source, ResolutionSource::RequestName);
        assert_eq!(sink.payloads()[0]["additional_data"]["assistant_id"], "asst-2");
    }

    #[tokio::test]
    async fn test_no_assistant_available() {
        let sink = RecordingSink::new();
        let dispatcher = dispatcher(InMemoryRegistry::new(), sink.clone());
        let selected = SelectedAssistant {
            id: Some("asst-1".to_string()),
            local_id: None,
            name: "Sales Bot".to_string(),
        };

        let outcome = dispatcher
            .dispatch("user-1", &DispatchRequest::new("start_campaign", 1), Some(&selected))
            .await;
        assert_eq!(outcome.failure(), Some(&DispatchFailure::NoAssistantAvailable));
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_rejection_is_reported() {
        let registry =
            InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant("asst-1", "Default", None)]);
        let sink = RecordingSink::with_status(500);
        let dispatcher = dispatcher(registry, sink.clone());

        let outcome = dispatcher
            .dispatch("user-1", &DispatchRequest::new("pause_campaign", 3), None)
            .await;
        match outcome {
            DispatchOutcome::Failed(DispatchFailure::WebhookFailed {
                status_code,
                assistant_id,
                ..
            }) => {
                assert_eq!(status_code, Some(500));
                assert_eq!(assistant_id, "asst-1");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // Sent exactly once; no automatic retry
        assert_eq!(sink.payloads().len(), 1);
    }

    #[tokio::test]
    async fn test_request_extras_and_logging() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let registry =
            InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant("asst-1", "Default", None)]);
        let sink = RecordingSink::new();
        let dispatcher = dispatcher(registry, sink.clone()).with_webhook_log(db.clone());

        let mut request = DispatchRequest::new("resume_campaign", 9);
        request.voice = Some("ana".to_string());
        request
            .additional_data
            .insert("campaign_name".to_string(), json!("Black Friday"));
        request
            .additional_data
            .insert("assistant_name".to_string(), json!("spoofed"));

        assert!(dispatcher.dispatch("user-1", &request, None).await.is_sent());

        let payload = &sink.payloads()[0];
        assert_eq!(payload["call"]["voice"], "ana");
        assert_eq!(payload["additional_data"]["campaign_name"], "Black Friday");
        assert_eq!(payload["additional_data"]["assistant_name"], "Default");

        let logs = webhook_log::list_recent(db.pool(), Some(9), 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].direction, WebhookDirection::Outbound);
        assert_eq!(logs[0].action, "resume_campaign");
        assert_eq!(logs[0].status_code, Some(200));
        assert!(logs[0].success);
    }
}
