//! Call records.
//!
//! At most one call exists per (campaign, client). This is enforced by
//! [`ensure_call`] checking before inserting, not by a schema constraint.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Call, CallUpdate};

/// Get a call by ID.
pub async fn get_call(pool: &SqlitePool, id: i64) -> Result<Call> {
    sqlx::query_as::<_, Call>(
        r#"
        SELECT id, campaign_id, client_id, status, duration, call_summary,
               recording_url, assistant_id, call_start, call_end, created_at
        FROM calls
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Call", id))
}

/// Find the call for a (campaign, client) pair.
pub async fn find_call(pool: &SqlitePool, campaign_id: i64, client_id: i64) -> Result<Option<Call>> {
    let call = sqlx::query_as::<_, Call>(
        r#"
        SELECT id, campaign_id, client_id, status, duration, call_summary,
               recording_url, assistant_id, call_start, call_end, created_at
        FROM calls
        WHERE campaign_id = ? AND client_id = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(campaign_id)
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(call)
}

/// Return the existing call for the pair, or insert a queued one.
///
/// The boolean is true when a row was inserted.
pub async fn ensure_call(
    pool: &SqlitePool,
    campaign_id: i64,
    client_id: i64,
    assistant_id: Option<&str>,
) -> Result<(Call, bool)> {
    if let Some(existing) = find_call(pool, campaign_id, client_id).await? {
        return Ok((existing, false));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO calls (campaign_id, client_id, assistant_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(campaign_id)
    .bind(client_id)
    .bind(assistant_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok((get_call(pool, id).await?, true))
}

/// Apply a delivered result to a call.
pub async fn update_call(pool: &SqlitePool, id: i64, update: &CallUpdate) -> Result<Call> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = COALESCE(?, status),
            duration = COALESCE(?, duration),
            call_summary = COALESCE(?, call_summary),
            recording_url = COALESCE(?, recording_url),
            assistant_id = COALESCE(?, assistant_id),
            call_start = COALESCE(?, call_start),
            call_end = COALESCE(?, call_end)
        WHERE id = ?
        "#,
    )
    .bind(&update.status)
    .bind(update.duration)
    .bind(&update.call_summary)
    .bind(&update.recording_url)
    .bind(&update.assistant_id)
    .bind(&update.call_start)
    .bind(&update.call_end)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Call", id));
    }

    get_call(pool, id).await
}

/// List a user's call history, optionally for one campaign, newest first.
pub async fn list_calls(
    pool: &SqlitePool,
    owner_user_id: &str,
    campaign_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Call>> {
    let calls = sqlx::query_as::<_, Call>(
        r#"
        SELECT calls.id, calls.campaign_id, calls.client_id, calls.status, calls.duration,
               calls.call_summary, calls.recording_url, calls.assistant_id,
               calls.call_start, calls.call_end, calls.created_at
        FROM calls
        JOIN campaigns ON campaigns.id = calls.campaign_id
        WHERE campaigns.owner_user_id = ?
          AND (? IS NULL OR calls.campaign_id = ?)
        ORDER BY calls.id DESC
        LIMIT ?
        "#,
    )
    .bind(owner_user_id)
    .bind(campaign_id)
    .bind(campaign_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(calls)
}
