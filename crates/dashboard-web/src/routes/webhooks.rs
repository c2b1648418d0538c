//! Inbound webhooks from the calling system.

use axum::extract::State;
use axum::Json;
use dispatch::{process_call_completion, CallCompletion, CompletionOutcome};

use crate::error::Result;
use crate::state::AppState;

/// Record a finished call.
pub async fn call_completed(
    State(state): State<AppState>,
    Json(completion): Json<CallCompletion>,
) -> Result<Json<CompletionOutcome>> {
    let outcome = process_call_completion(&state.db, &completion).await?;
    Ok(Json(outcome))
}
