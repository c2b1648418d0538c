//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Provisioning state of a local assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssistantStatus {
    Pending,
    Ready,
    Failed,
}

impl AssistantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantStatus::Pending => "pending",
            AssistantStatus::Ready => "ready",
            AssistantStatus::Failed => "failed",
        }
    }
}

/// Lifecycle state of a campaign.
///
/// Transitions are driven by explicit user actions; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Stopped,
    Completed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 5] = [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Stopped,
        CampaignStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Stopped => "stopped",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CampaignStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown campaign status: {}", s))
    }
}

/// Direction of a logged webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WebhookDirection {
    /// Sent by us to the automation platform.
    Outbound,
    /// Received from the calling system.
    Inbound,
}

/// A locally cached assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Assistant {
    /// Local identifier (UUID v4), distinct from the registry ID.
    pub local_id: String,
    /// Registry-issued ID, once published or synced.
    pub remote_assistant_id: Option<String>,
    pub name: String,
    pub system_prompt: String,
    pub first_message: String,
    pub model: String,
    pub voice: String,
    pub voice_id: Option<String>,
    pub owner_user_id: String,
    pub published: bool,
    pub status: AssistantStatus,
    pub created_at: String,
}

/// Fields for inserting an assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssistant {
    pub owner_user_id: String,
    pub remote_assistant_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub first_message: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voice: String,
    pub voice_id: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub status: Option<AssistantStatus>,
}

/// Editable assistant fields. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantUpdate {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub first_message: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub voice_id: Option<String>,
}

/// A calling campaign with aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub total_calls: i64,
    pub answered_calls: i64,
    /// Mean duration in seconds over delivered call durations.
    pub average_duration: f64,
    /// Number of durations folded into `average_duration`.
    pub duration_samples: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub owner_user_id: String,
    /// Registry assistant ID preferred for this campaign.
    pub assistant_id: Option<String>,
    pub created_at: String,
}

/// Fields for inserting a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub owner_user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub assistant_id: Option<String>,
}

/// A contact that can be called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub owner_user_id: String,
    pub created_at: String,
}

/// Fields for inserting or replacing a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub owner_user_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// A named group of clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClientGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: String,
    pub created_at: String,
}

/// A call placed for a (campaign, client) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Call {
    pub id: i64,
    pub campaign_id: i64,
    pub client_id: i64,
    pub status: String,
    /// Duration in seconds.
    pub duration: i64,
    pub call_summary: Option<String>,
    pub recording_url: Option<String>,
    pub assistant_id: Option<String>,
    pub call_start: Option<String>,
    pub call_end: Option<String>,
    pub created_at: String,
}

/// Fields written when a call result is delivered. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUpdate {
    pub status: Option<String>,
    pub duration: Option<i64>,
    pub call_summary: Option<String>,
    pub recording_url: Option<String>,
    pub assistant_id: Option<String>,
    pub call_start: Option<String>,
    pub call_end: Option<String>,
}

/// A logged webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WebhookLog {
    pub id: i64,
    pub direction: WebhookDirection,
    pub action: String,
    pub campaign_id: Option<i64>,
    /// Raw JSON payload.
    pub payload: String,
    pub status_code: Option<i64>,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: String,
}

/// Fields for logging a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWebhookLog {
    pub direction: WebhookDirection,
    pub action: String,
    pub campaign_id: Option<i64>,
    pub payload: String,
    pub status_code: Option<i64>,
    pub success: bool,
    pub error: Option<String>,
}

/// A user's stored assistant selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SelectionRecord {
    pub user_id: String,
    /// JSON representation of the selected assistant.
    pub assistant_json: String,
    pub updated_at: String,
}
