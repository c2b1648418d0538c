//! Campaign analytics.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use database::{campaign, client, CampaignStatus};
use serde::Serialize;

use crate::error::Result;
use crate::extract::UserId;
use crate::state::AppState;

/// Aggregates across the caller's campaigns.
#[derive(Debug, Serialize)]
pub struct Analytics {
    /// Count for every status, zeros included.
    pub campaigns_by_status: BTreeMap<&'static str, i64>,
    pub total_campaigns: i64,
    pub total_clients: i64,
    pub total_calls: i64,
    pub answered_calls: i64,
    /// Answered over total, 0 when there are no calls.
    pub answer_rate: f64,
    /// Seconds, over delivered durations.
    pub average_duration: f64,
}

pub async fn analytics(State(state): State<AppState>, user: UserId) -> Result<Json<Analytics>> {
    let pool = state.db.pool();

    let mut campaigns_by_status: BTreeMap<&'static str, i64> = CampaignStatus::ALL
        .iter()
        .map(|status| (status.as_str(), 0))
        .collect();
    for (status, count) in campaign::count_by_status(pool, user.as_str()).await? {
        campaigns_by_status.insert(status.as_str(), count);
    }
    let total_campaigns = campaigns_by_status.values().sum();

    let totals = campaign::call_totals(pool, user.as_str()).await?;
    let answer_rate = if totals.total_calls > 0 {
        totals.answered_calls as f64 / totals.total_calls as f64
    } else {
        0.0
    };

    Ok(Json(Analytics {
        campaigns_by_status,
        total_campaigns,
        total_clients: client::count_clients(pool, user.as_str()).await?,
        total_calls: totals.total_calls,
        answered_calls: totals.answered_calls,
        answer_rate,
        average_duration: totals.average_duration,
    }))
}
