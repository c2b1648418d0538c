//! Client and client group routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{client, client_group, Client, ClientGroup, NewClient};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::extract::UserId;
use crate::state::AppState;

/// Client fields accepted on create and update.
#[derive(Debug, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientInput {
    fn into_new(self, owner: &UserId) -> NewClient {
        NewClient {
            owner_user_id: owner.as_str().to_string(),
            name: self.name,
            phone: self.phone,
            email: self.email,
            notes: self.notes,
        }
    }
}

/// List the caller's clients.
pub async fn list_clients(State(state): State<AppState>, user: UserId) -> Result<Json<Vec<Client>>> {
    let clients = client::list_clients(state.db.pool(), user.as_str()).await?;
    Ok(Json(clients))
}

/// Create a client.
pub async fn create_client(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>)> {
    let created = client::create_client(state.db.pool(), &input.into_new(&user)).await?;
    info!(client_id = created.id, "Client created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get one client.
pub async fn get_client(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<Json<Client>> {
    let found = client::get_owned_client(state.db.pool(), user.as_str(), id).await?;
    Ok(Json(found))
}

/// Replace a client's fields.
pub async fn update_client(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>> {
    let pool = state.db.pool();
    client::get_owned_client(pool, user.as_str(), id).await?;
    let updated = client::update_client(pool, id, &input.into_new(&user)).await?;
    Ok(Json(updated))
}

/// Delete a client.
pub async fn delete_client(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let pool = state.db.pool();
    client::get_owned_client(pool, user.as_str(), id).await?;
    client::delete_client(pool, id).await?;
    info!(client_id = id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Group with its member count.
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: ClientGroup,
    pub member_count: i64,
}

/// Group fields accepted on create.
#[derive(Debug, Deserialize)]
pub struct GroupInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for adding a group member.
#[derive(Debug, Deserialize)]
pub struct MemberInput {
    pub client_id: i64,
}

/// List the caller's groups.
pub async fn list_groups(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<GroupSummary>>> {
    let groups = client_group::list_groups_with_member_counts(state.db.pool(), user.as_str())
        .await?
        .into_iter()
        .map(|(group, member_count)| GroupSummary {
            group,
            member_count,
        })
        .collect();
    Ok(Json(groups))
}

/// Create a group.
pub async fn create_group(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<GroupInput>,
) -> Result<(StatusCode, Json<ClientGroup>)> {
    let created = client_group::create_group(
        state.db.pool(),
        user.as_str(),
        &input.name,
        input.description.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a group. Its clients are kept.
pub async fn delete_group(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let pool = state.db.pool();
    client_group::get_owned_group(pool, user.as_str(), id).await?;
    client_group::delete_group(pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a group's members.
pub async fn list_members(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Client>>> {
    let pool = state.db.pool();
    client_group::get_owned_group(pool, user.as_str(), id).await?;
    let members = client_group::list_members(pool, id).await?;
    Ok(Json(members))
}

/// Add one of the caller's clients to a group.
pub async fn add_member(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<i64>,
    Json(input): Json<MemberInput>,
) -> Result<StatusCode> {
    let pool = state.db.pool();
    client_group::get_owned_group(pool, user.as_str(), id).await?;
    client::get_owned_client(pool, user.as_str(), input.client_id).await?;
    client_group::add_member(pool, id, input.client_id).await?;
    Ok(StatusCode::CREATED)
}

/// Remove a client from a group.
pub async fn remove_member(
    State(state): State<AppState>,
    user: UserId,
    Path((id, client_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    let pool = state.db.pool();
    client_group::get_owned_group(pool, user.as_str(), id).await?;
    client_group::remove_member(pool, id, client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
