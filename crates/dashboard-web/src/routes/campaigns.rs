//! Campaign routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{campaign, campaign_client, client, client_group, Campaign, Client, NewCampaign};
use dispatch::{CallClientResult, CampaignAction, CampaignActionResult, DispatchOverrides};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WebError};
use crate::extract::UserId;
use crate::state::AppState;

/// Campaign fields accepted on create.
#[derive(Debug, Deserialize)]
pub struct CampaignInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Registry assistant preferred for this campaign.
    #[serde(default)]
    pub assistant_id: Option<String>,
}

/// Campaign with its targeted clients.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub clients: Vec<Client>,
}

/// Clients to target, individually and/or by group.
#[derive(Debug, Deserialize)]
pub struct TargetInput {
    #[serde(default)]
    pub client_ids: Vec<i64>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TargetResponse {
    pub added: u64,
}

/// Body for calling one client.
#[derive(Debug, Deserialize)]
pub struct CallInput {
    pub client_id: i64,
    #[serde(flatten)]
    pub overrides: DispatchOverrides,
}

/// List the caller's campaigns.
pub async fn list_campaigns(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Campaign>>> {
    let campaigns = campaign::list_campaigns(state.db.pool(), user.as_str()).await?;
    Ok(Json(campaigns))
}

/// Create a draft campaign.
pub async fn create_campaign(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<CampaignInput>,
) -> Result<(StatusCode, Json<Campaign>)> {
    let new = NewCampaign {
        owner_user_id: user.as_str().to_string(),
        name: input.name,
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
        assistant_id: input.assistant_id,
    };
    let created = campaign::create_campaign(state.db.pool(), &new).await?;
    info!(campaign_id = created.id, "Campaign created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a campaign and its targets.
pub async fn get_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<Json<CampaignDetail>> {
    let pool = state.db.pool();
    let found = campaign::get_owned_campaign(pool, user.as_str(), id).await?;
    let clients = campaign_client::list_clients(pool, id).await?;
    Ok(Json(CampaignDetail {
        campaign: found,
        clients,
    }))
}

/// Delete a campaign with its calls and targets.
pub async fn delete_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let pool = state.db.pool();
    campaign::get_owned_campaign(pool, user.as_str(), id).await?;
    campaign::delete_campaign(pool, id).await?;
    info!(campaign_id = id, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Target clients and groups. Clients already targeted are skipped.
pub async fn add_targets(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    Json(input): Json<TargetInput>,
) -> Result<Json<TargetResponse>> {
    if input.client_ids.is_empty() && input.group_id.is_none() {
        return Err(WebError::BadRequest(
            "client_ids or group_id is required".to_string(),
        ));
    }

    let pool = state.db.pool();
    campaign::get_owned_campaign(pool, user.as_str(), id).await?;

    let mut added = 0;
    for client_id in &input.client_ids {
        client::get_owned_client(pool, user.as_str(), *client_id).await?;
        if campaign_client::add_client(pool, id, *client_id).await? {
            added += 1;
        }
    }
    if let Some(group_id) = input.group_id {
        client_group::get_owned_group(pool, user.as_str(), group_id).await?;
        added += campaign_client::add_group(pool, id, group_id).await?;
    }

    Ok(Json(TargetResponse { added }))
}

/// Status code for an action whose dispatch may have failed.
fn dispatch_status(sent: bool) -> StatusCode {
    if sent {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Overrides from an action body. An empty body means none; anything else
/// must decode.
fn parse_overrides(body: &[u8]) -> Result<DispatchOverrides> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DispatchOverrides::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| WebError::BadRequest(format!("invalid action body: {}", err)))
}

async fn run_action(
    state: AppState,
    user: UserId,
    id: i64,
    action: CampaignAction,
    body: Bytes,
) -> Result<(StatusCode, Json<CampaignActionResult>)> {
    let overrides = parse_overrides(&body)?;
    let result = state
        .campaigns
        .run(user.as_str(), id, action, &overrides)
        .await?;
    Ok((dispatch_status(result.dispatch.is_sent()), Json(result)))
}

pub async fn start_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<CampaignActionResult>)> {
    run_action(state, user, id, CampaignAction::Start, body).await
}

pub async fn pause_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<CampaignActionResult>)> {
    run_action(state, user, id, CampaignAction::Pause, body).await
}

pub async fn resume_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<CampaignActionResult>)> {
    run_action(state, user, id, CampaignAction::Resume, body).await
}

pub async fn stop_campaign(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<CampaignActionResult>)> {
    run_action(state, user, id, CampaignAction::Stop, body).await
}

/// Dispatch a call to one client.
pub async fn call_client(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    Json(input): Json<CallInput>,
) -> Result<(StatusCode, Json<CallClientResult>)> {
    let result = state
        .campaigns
        .call_client(user.as_str(), id, input.client_id, &input.overrides)
        .await?;
    Ok((dispatch_status(result.dispatch.is_sent()), Json(result)))
}
