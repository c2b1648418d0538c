//! Call history.

use axum::extract::{Query, State};
use axum::Json;
use database::{call, campaign, Call};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::UserId;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub campaign_id: Option<i64>,
    pub limit: Option<i64>,
}

/// The caller's calls, newest first, optionally for one campaign.
pub async fn history(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Call>>> {
    let pool = state.db.pool();
    if let Some(campaign_id) = query.campaign_id {
        campaign::get_owned_campaign(pool, user.as_str(), campaign_id).await?;
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let calls = call::list_calls(pool, user.as_str(), query.campaign_id, limit).await?;
    Ok(Json(calls))
}
