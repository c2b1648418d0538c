//! Clients targeted by a campaign.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Client;

/// Target a client. Returns false when it was already targeted.
pub async fn add_client(pool: &SqlitePool, campaign_id: i64, client_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO campaign_clients (campaign_id, client_id)
        VALUES (?, ?)
        "#,
    )
    .bind(campaign_id)
    .bind(client_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Target every member of a group. Returns the number of newly added clients.
pub async fn add_group(pool: &SqlitePool, campaign_id: i64, group_id: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO campaign_clients (campaign_id, client_id)
        SELECT ?, client_id
        FROM client_group_members
        WHERE group_id = ?
        "#,
    )
    .bind(campaign_id)
    .bind(group_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Set the per-target status (e.g. "called").
pub async fn set_status(
    pool: &SqlitePool,
    campaign_id: i64,
    client_id: i64,
    status: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE campaign_clients
        SET status = ?
        WHERE campaign_id = ? AND client_id = ?
        "#,
    )
    .bind(status)
    .bind(campaign_id)
    .bind(client_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List the clients targeted by a campaign.
pub async fn list_clients(pool: &SqlitePool, campaign_id: i64) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT c.id, c.name, c.phone, c.email, c.notes, c.owner_user_id, c.created_at
        FROM clients c
        JOIN campaign_clients cc ON cc.client_id = c.id
        WHERE cc.campaign_id = ?
        ORDER BY c.name COLLATE NOCASE, c.id
        "#,
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}
