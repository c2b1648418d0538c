//! Inbound call-completion deliveries.

use database::{
    call, campaign, client, webhook_log, Call, CallUpdate, Campaign, Database, DatabaseError,
    NewWebhookLog, WebhookDirection,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Call statuses that count as answered.
pub const ANSWERED_STATUSES: [&str; 3] = ["completed", "answered", "ended"];

/// Action name used when logging completions.
pub const CALL_COMPLETED_ACTION: &str = "call_completed";

pub fn is_answered(status: &str) -> bool {
    let status = status.trim();
    ANSWERED_STATUSES
        .iter()
        .any(|answered| answered.eq_ignore_ascii_case(status))
}

/// Body posted by the calling system when a call ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCompletion {
    pub client_id: i64,
    pub campaign_id: i64,
    pub call_status: String,
    /// Seconds.
    #[serde(default)]
    pub call_duration: Option<i64>,
    #[serde(default)]
    pub call_start: Option<String>,
    #[serde(default)]
    pub call_end: Option<String>,
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
}

/// What a completion changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub call: Call,
    pub call_created: bool,
    pub newly_answered: bool,
    /// Campaign statistics after folding in this call.
    pub campaign: Campaign,
}

/// Apply a completion and log the delivery, whatever the result.
pub async fn process_call_completion(
    db: &Database,
    completion: &CallCompletion,
) -> Result<CompletionOutcome> {
    let result = apply(db, completion).await;

    let entry = NewWebhookLog {
        direction: WebhookDirection::Inbound,
        action: CALL_COMPLETED_ACTION.to_string(),
        campaign_id: Some(completion.campaign_id),
        payload: serde_json::to_string(completion)?,
        status_code: None,
        success: result.is_ok(),
        error: result.as_ref().err().map(|e| e.to_string()),
    };
    if let Err(err) = webhook_log::record(db.pool(), &entry).await {
        warn!(error = %err, "Failed to log call completion");
    }

    result
}

async fn apply(db: &Database, completion: &CallCompletion) -> Result<CompletionOutcome> {
    let pool = db.pool();
    let campaign_row = campaign::get_campaign(pool, completion.campaign_id).await?;
    let client_row = client::get_client(pool, completion.client_id).await?;
    if client_row.owner_user_id != campaign_row.owner_user_id {
        return Err(DatabaseError::NotFound {
            entity: "Client",
            id: completion.client_id.to_string(),
        }
        .into());
    }

    let (existing, created) = call::ensure_call(
        pool,
        completion.campaign_id,
        completion.client_id,
        completion.assistant_id.as_deref(),
    )
    .await?;
    let was_answered = is_answered(&existing.status);

    let update = CallUpdate {
        status: Some(completion.call_status.trim().to_lowercase()),
        duration: completion.call_duration,
        call_summary: completion.call_summary.clone(),
        recording_url: completion.recording_url.clone(),
        assistant_id: completion.assistant_id.clone(),
        call_start: completion.call_start.clone(),
        call_end: completion.call_end.clone(),
    };
    let updated = call::update_call(pool, existing.id, &update).await?;

    let newly_answered = is_answered(&completion.call_status) && !was_answered;
    let campaign_row = campaign::record_call_result(
        pool,
        completion.campaign_id,
        created,
        newly_answered,
        completion.call_duration,
    )
    .await?;

    info!(
        campaign_id = completion.campaign_id,
        client_id = completion.client_id,
        call_id = updated.id,
        status = %updated.status,
        created,
        newly_answered,
        "Call completion recorded"
    );

    Ok(CompletionOutcome {
        call: updated,
        call_created: created,
        newly_answered,
        campaign: campaign_row,
    })
}
