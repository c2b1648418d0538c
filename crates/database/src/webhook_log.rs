//! Webhook delivery log.

use sqlx::SqlitePool;

use crate::models::{NewWebhookLog, WebhookLog};
use crate::Result;

/// Record a delivery and return its ID.
pub async fn record(pool: &SqlitePool, entry: &NewWebhookLog) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO webhook_logs (direction, action, campaign_id, payload, status_code, success, error)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.direction)
    .bind(&entry.action)
    .bind(entry.campaign_id)
    .bind(&entry.payload)
    .bind(entry.status_code)
    .bind(entry.success)
    .bind(&entry.error)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Most recent deliveries, optionally for one campaign.
pub async fn list_recent(
    pool: &SqlitePool,
    campaign_id: Option<i64>,
    limit: i64,
) -> Result<Vec<WebhookLog>> {
    let logs = sqlx::query_as::<_, WebhookLog>(
        r#"
        SELECT id, direction, action, campaign_id, payload, status_code, success, error, created_at
        FROM webhook_logs
        WHERE (? IS NULL OR campaign_id = ?)
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(campaign_id)
    .bind(campaign_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
