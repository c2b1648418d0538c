//! Campaign lifecycle actions and per-client calls.
//!
//! Each action updates local state first and then dispatches. A webhook
//! failure does not roll the local change back; both results are reported.

use std::sync::Arc;

use database::{call, campaign, campaign_client, client, Call, Campaign, CampaignStatus, Database};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::dispatcher::{DispatchOutcome, DispatchRequest, Dispatcher};
use crate::error::Result;
use crate::selection::SelectionStore;

/// Lifecycle actions a user can take on a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignAction {
    Start,
    Pause,
    Resume,
    Stop,
}

impl CampaignAction {
    /// Webhook action name.
    pub fn action_name(&self) -> &'static str {
        match self {
            CampaignAction::Start => "start_campaign",
            CampaignAction::Pause => "pause_campaign",
            CampaignAction::Resume => "resume_campaign",
            CampaignAction::Stop => "stop_campaign",
        }
    }

    /// Status the campaign moves to.
    pub fn target_status(&self) -> CampaignStatus {
        match self {
            CampaignAction::Start | CampaignAction::Resume => CampaignStatus::Active,
            CampaignAction::Pause => CampaignStatus::Paused,
            CampaignAction::Stop => CampaignStatus::Stopped,
        }
    }
}

/// Optional per-request overrides for assistant and call config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOverrides {
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub assistant_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Result of a lifecycle action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignActionResult {
    /// Campaign after the status change.
    pub campaign: Campaign,
    /// Whether the stored status changed.
    pub status_updated: bool,
    pub dispatch: DispatchOutcome,
}

/// Result of calling one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallClientResult {
    /// The call record, present once the dispatch was sent.
    pub call: Option<Call>,
    /// Whether this request created the call record.
    pub call_created: bool,
    pub dispatch: DispatchOutcome,
}

/// Runs campaign actions for a user.
#[derive(Clone)]
pub struct CampaignActions {
    db: Database,
    dispatcher: Dispatcher,
    selections: Arc<SelectionStore>,
}

impl CampaignActions {
    pub fn new(db: Database, dispatcher: Dispatcher, selections: Arc<SelectionStore>) -> Self {
        Self {
            db,
            dispatcher,
            selections,
        }
    }

    pub async fn start(
        &self,
        user_id: &str,
        campaign_id: i64,
        overrides: &DispatchOverrides,
    ) -> Result<CampaignActionResult> {
        self.run(user_id, campaign_id, CampaignAction::Start, overrides)
            .await
    }

    pub async fn pause(
        &self,
        user_id: &str,
        campaign_id: i64,
        overrides: &DispatchOverrides,
    ) -> Result<CampaignActionResult> {
        self.run(user_id, campaign_id, CampaignAction::Pause, overrides)
            .await
    }

    pub async fn resume(
        &self,
        user_id: &str,
        campaign_id: i64,
        overrides: &DispatchOverrides,
    ) -> Result<CampaignActionResult> {
        self.run(user_id, campaign_id, CampaignAction::Resume, overrides)
            .await
    }

    pub async fn stop(
        &self,
        user_id: &str,
        campaign_id: i64,
        overrides: &DispatchOverrides,
    ) -> Result<CampaignActionResult> {
        self.run(user_id, campaign_id, CampaignAction::Stop, overrides)
            .await
    }

    /// Apply a lifecycle action. Any transition is allowed.
    pub async fn run(
        &self,
        user_id: &str,
        campaign_id: i64,
        action: CampaignAction,
        overrides: &DispatchOverrides,
    ) -> Result<CampaignActionResult> {
        let pool = self.db.pool();
        let current = campaign::get_owned_campaign(pool, user_id, campaign_id).await?;
        let target = action.target_status();

        let updated = campaign::update_status(pool, campaign_id, target).await?;
        let status_updated = current.status != target;
        info!(
            campaign_id,
            action = action.action_name(),
            from = %current.status,
            to = %target,
            "Campaign status set"
        );

        let mut additional_data = Map::new();
        additional_data.insert("campaign_name".to_string(), Value::from(updated.name.clone()));
        additional_data.insert("status".to_string(), Value::from(target.as_str()));

        let mut request = request_for(action.action_name(), &updated, overrides);
        request.additional_data = additional_data;

        let selected = self.selections.get(user_id).await;
        let dispatch = self
            .dispatcher
            .dispatch(user_id, &request, selected.as_ref())
            .await;

        Ok(CampaignActionResult {
            campaign: updated,
            status_updated,
            dispatch,
        })
    }

    /// Dispatch a call to one client of a campaign.
    ///
    /// The call record for the pair is created once the dispatch is sent;
    /// creating it counts towards the campaign's `total_calls`.
    pub async fn call_client(
        &self,
        user_id: &str,
        campaign_id: i64,
        client_id: i64,
        overrides: &DispatchOverrides,
    ) -> Result<CallClientResult> {
        let pool = self.db.pool();
        let campaign = campaign::get_owned_campaign(pool, user_id, campaign_id).await?;
        let target = client::get_owned_client(pool, user_id, client_id).await?;

        let mut request = request_for("call_client", &campaign, overrides);
        request.client_id = Some(target.id);
        request.client_name = Some(target.name.clone());
        request.client_phone = Some(target.phone.clone());
        request
            .additional_data
            .insert("campaign_name".to_string(), Value::from(campaign.name.clone()));

        let selected = self.selections.get(user_id).await;
        let dispatch = self
            .dispatcher
            .dispatch(user_id, &request, selected.as_ref())
            .await;

        let assistant_id = dispatch.receipt().map(|r| r.assistant_id.clone());
        let Some(assistant_id) = assistant_id else {
            return Ok(CallClientResult {
                call: None,
                call_created: false,
                dispatch,
            });
        };

        let (call_row, created) =
            call::ensure_call(pool, campaign_id, client_id, Some(&assistant_id)).await?;
        if created {
            campaign::record_call_result(pool, campaign_id, true, false, None).await?;
        }
        campaign_client::set_status(pool, campaign_id, client_id, "called").await?;

        info!(campaign_id, client_id, call_id = call_row.id, created, "Client call dispatched");

        Ok(CallClientResult {
            call: Some(call_row),
            call_created: created,
            dispatch,
        })
    }
}

/// Base request for a campaign, with overrides and the campaign's own assistant hint.
fn request_for(action: &str, campaign: &Campaign, overrides: &DispatchOverrides) -> DispatchRequest {
    DispatchRequest {
        action: action.to_string(),
        campaign_id: campaign.id,
        assistant_id: overrides
            .assistant_id
            .clone()
            .or_else(|| campaign.assistant_id.clone()),
        assistant_name: overrides.assistant_name.clone(),
        model: overrides.model.clone(),
        voice: overrides.voice.clone(),
        language: overrides.language.clone(),
        ..DispatchRequest::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::dispatcher::DispatchFailure;
    use crate::testing::RecordingSink;
    use database::{NewCampaign, NewClient};
    use mock_vapi::InMemoryRegistry;

    struct Fixture {
        db: Database,
        sink: RecordingSink,
        actions: CampaignActions,
    }

    async fn fixture(registry: InMemoryRegistry, sink: RecordingSink) -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            Arc::new(sink.clone()),
            DispatchConfig::new("https://automation.example.com"),
        );
        let selections = Arc::new(SelectionStore::new(db.clone()));
        let actions = CampaignActions::new(db.clone(), dispatcher, selections);
        Fixture { db, sink, actions }
    }

    fn default_registry() -> InMemoryRegistry {
        InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant("asst-1", "Default", None)])
    }

    async fn new_campaign(db: &Database, owner: &str) -> Campaign {
        campaign::create_campaign(
            db.pool(),
            &NewCampaign {
                owner_user_id: owner.to_string(),
                name: "Launch".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_lifecycle_actions() {
        let f = fixture(default_registry(), RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-1").await;
        let none = DispatchOverrides::default();

        let started = f.actions.start("user-1", c.id, &none).await.unwrap();
        assert_eq!(started.campaign.status, CampaignStatus::Active);
        assert!(started.status_updated);
        assert!(started.dispatch.is_sent());

        let paused = f.actions.pause("user-1", c.id, &none).await.unwrap();
        assert_eq!(paused.campaign.status, CampaignStatus::Paused);

        let resumed = f.actions.resume("user-1", c.id, &none).await.unwrap();
        assert_eq!(resumed.campaign.status, CampaignStatus::Active);

        let stopped = f.actions.stop("user-1", c.id, &none).await.unwrap();
        assert_eq!(stopped.campaign.status, CampaignStatus::Stopped);

        let actions: Vec<String> = f
            .sink
            .payloads()
            .iter()
            .map(|p| p["action"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            actions,
            vec!["start_campaign", "pause_campaign", "resume_campaign", "stop_campaign"]
        );
    }

    #[tokio::test]
    async fn test_stop_on_draft_is_allowed() {
        let f = fixture(default_registry(), RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-1").await;
        let result = f
            .actions
            .stop("user-1", c.id, &DispatchOverrides::default())
            .await
            .unwrap();
        assert_eq!(result.campaign.status, CampaignStatus::Stopped);
    }

    #[tokio::test]
    async fn test_failed_webhook_keeps_status() {
        let f = fixture(default_registry(), RecordingSink::with_status(503)).await;
        let c = new_campaign(&f.db, "user-1").await;

        let result = f
            .actions
            .start("user-1", c.id, &DispatchOverrides::default())
            .await
            .unwrap();
        assert!(!result.dispatch.is_sent());
        let stored = campaign::get_campaign(f.db.pool(), c.id).await.unwrap();
        assert_eq!(stored.status, CampaignStatus::Active);
    }

    #[tokio::test]
    async fn test_other_users_campaign_is_not_found() {
        let f = fixture(default_registry(), RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-1").await;

        let err = f
            .actions
            .start("user-2", c.id, &DispatchOverrides::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(f.sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_call_client_creates_call_once() {
        let f = fixture(default_registry(), RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-1").await;
        let target = client::create_client(
            f.db.pool(),
            &NewClient {
                owner_user_id: "user-1".to_string(),
                name: "Maria Souza".to_string(),
                phone: "+5511999999999".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let none = DispatchOverrides::default();

        let first = f.actions.call_client("user-1", c.id, target.id, &none).await.unwrap();
        assert!(first.call_created);
        let call_row = first.call.unwrap();
        assert_eq!(call_row.assistant_id.as_deref(), Some("asst-1"));

        let second = f.actions.call_client("user-1", c.id, target.id, &none).await.unwrap();
        assert!(!second.call_created);
        assert_eq!(second.call.unwrap().id, call_row.id);

        let stored = campaign::get_campaign(f.db.pool(), c.id).await.unwrap();
        assert_eq!(stored.total_calls, 1);

        let payload = &f.sink.payloads()[0];
        assert_eq!(payload["action"], "call_client");
        assert_eq!(payload["client_id"], target.id);
        assert_eq!(payload["client_name"], "Maria Souza");
        assert_eq!(payload["client_phone"], "+5511999999999");
    }

    #[tokio::test]
    async fn test_call_client_without_assistant() {
        let f = fixture(InMemoryRegistry::new(), RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-1").await;
        let target = client::create_client(
            f.db.pool(),
            &NewClient {
                owner_user_id: "user-1".to_string(),
                name: "Maria Souza".to_string(),
                phone: "+5511999999999".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = f
            .actions
            .call_client("user-1", c.id, target.id, &DispatchOverrides::default())
            .await
            .unwrap();
        assert_eq!(result.dispatch.failure(), Some(&DispatchFailure::NoAssistantAvailable));
        assert!(result.call.is_none());
        assert!(call::find_call(f.db.pool(), c.id, target.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_users_assistant_is_never_used() {
        let registry = InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant(
            "b-secret",
            "User B Private Bot",
            Some("user-b"),
        )]);
        let f = fixture(registry, RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-a").await;

        let overrides = DispatchOverrides {
            assistant_name: Some("Private Bot".to_string()),
            ..Default::default()
        };
        let result = f.actions.start("user-a", c.id, &overrides).await.unwrap();
        assert_eq!(result.dispatch.failure(), Some(&DispatchFailure::NoAssistantAvailable));
        assert!(f.sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_own_assistant_preferred_over_foreign_name_match() {
        let registry = InMemoryRegistry::with_assistants(vec![
            InMemoryRegistry::assistant("b-secret", "Sales Bot", Some("user-b")),
            InMemoryRegistry::assistant("a-own", "Support Agent", Some("user-a")),
        ]);
        let f = fixture(registry, RecordingSink::new()).await;
        let c = new_campaign(&f.db, "user-a").await;

        let overrides = DispatchOverrides {
            assistant_name: Some("sales".to_string()),
            ..Default::default()
        };
        let result = f.actions.start("user-a", c.id, &overrides).await.unwrap();
        let receipt = result.dispatch.receipt().unwrap();
        assert_eq!(receipt.assistant_id, "a-own");
        assert_eq!(f.sink.payloads()[0]["additional_data"]["assistant_id"], "a-own");
    }
}
