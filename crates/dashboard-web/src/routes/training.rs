//! Assistant training routes: local drafts, publishing, selection and sync.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{assistant, Assistant, AssistantUpdate, NewAssistant};
use dispatch::{
    delete_assistant, publish_assistant, DeletionReport, PublishOutcome, SelectedAssistant,
    SyncReport,
};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::extract::UserId;
use crate::state::AppState;

/// Assistant fields accepted on create.
#[derive(Debug, Deserialize)]
pub struct AssistantInput {
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub first_message: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voice: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// List the caller's cached assistants.
pub async fn list_assistants(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Assistant>>> {
    let assistants = assistant::list_assistants(state.db.pool(), user.as_str()).await?;
    Ok(Json(assistants))
}

/// Create a local draft. Publishing is a separate step.
pub async fn create_assistant(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<AssistantInput>,
) -> Result<(StatusCode, Json<Assistant>)> {
    let new = NewAssistant {
        owner_user_id: user.as_str().to_string(),
        remote_assistant_id: None,
        name: input.name,
        system_prompt: input.system_prompt,
        first_message: input.first_message,
        model: input.model,
        voice: input.voice,
        voice_id: input.voice_id,
        published: false,
        status: None,
    };
    let created = assistant::create_assistant(state.db.pool(), &new).await?;
    info!(local_id = %created.local_id, "Assistant draft created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_assistant(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<Assistant>> {
    let found = assistant::get_owned_assistant(state.db.pool(), user.as_str(), &id).await?;
    Ok(Json(found))
}

/// Edit the local copy. Local edits are kept across syncs.
pub async fn update_assistant(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    Json(update): Json<AssistantUpdate>,
) -> Result<Json<Assistant>> {
    let pool = state.db.pool();
    assistant::get_owned_assistant(pool, user.as_str(), &id).await?;
    let updated = assistant::update_assistant(pool, &id, &update).await?;
    Ok(Json(updated))
}

/// Delete from the registry, the cache and the selection.
pub async fn delete(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<DeletionReport>> {
    let report = delete_assistant(
        &state.db,
        state.registry.as_ref(),
        &state.selections,
        user.as_str(),
        &id,
    )
    .await?;
    Ok(Json(report))
}

/// Publish a draft to the registry.
pub async fn publish(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<PublishOutcome>)> {
    let outcome = publish_assistant(&state.db, state.registry.as_ref(), user.as_str(), &id).await?;
    let status = if outcome.published {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(outcome)))
}

/// Make an assistant the caller's selection.
pub async fn select(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<SelectedAssistant>> {
    let found = assistant::get_owned_assistant(state.db.pool(), user.as_str(), &id).await?;
    let selected = SelectedAssistant::from(&found);
    state.selections.set(user.as_str(), selected.clone()).await?;
    Ok(Json(selected))
}

/// The caller's current selection, or `null`.
pub async fn selected(
    State(state): State<AppState>,
    user: UserId,
) -> Json<Option<SelectedAssistant>> {
    Json(state.selections.get(user.as_str()).await)
}

/// Run one reconciliation pass for the caller.
pub async fn sync(State(state): State<AppState>, user: UserId) -> Json<SyncReport> {
    Json(state.reconciler.sync_user(user.as_str()).await)
}
