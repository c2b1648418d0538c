//! Campaign CRUD and statistics.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Campaign, CampaignStatus, NewCampaign};
use crate::validation::validate_name;

/// Create a campaign in `draft` status.
pub async fn create_campaign(pool: &SqlitePool, new: &NewCampaign) -> Result<Campaign> {
    validate_name("name", &new.name)?;

    let id = sqlx::query(
        r#"
        INSERT INTO campaigns (name, description, start_date, end_date, owner_user_id, assistant_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(&new.start_date)
    .bind(&new.end_date)
    .bind(&new.owner_user_id)
    .bind(&new.assistant_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_campaign(pool, id).await
}

/// Get a campaign by ID.
pub async fn get_campaign(pool: &SqlitePool, id: i64) -> Result<Campaign> {
    sqlx::query_as::<_, Campaign>(
        r#"
        SELECT id, name, description, status, total_calls, answered_calls,
               average_duration, duration_samples, start_date, end_date,
               owner_user_id, assistant_id, created_at
        FROM campaigns
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Campaign", id))
}

/// Get a campaign, treating another user's campaign as missing.
pub async fn get_owned_campaign(pool: &SqlitePool, owner_user_id: &str, id: i64) -> Result<Campaign> {
    let campaign = get_campaign(pool, id).await?;
    if campaign.owner_user_id != owner_user_id {
        return Err(DatabaseError::not_found("Campaign", id));
    }
    Ok(campaign)
}

/// List a user's campaigns, newest first.
pub async fn list_campaigns(pool: &SqlitePool, owner_user_id: &str) -> Result<Vec<Campaign>> {
    let campaigns = sqlx::query_as::<_, Campaign>(
        r#"
        SELECT id, name, description, status, total_calls, answered_calls,
               average_duration, duration_samples, start_date, end_date,
               owner_user_id, assistant_id, created_at
        FROM campaigns
        WHERE owner_user_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(campaigns)
}

/// Set a campaign's status. Any transition is accepted.
pub async fn update_status(pool: &SqlitePool, id: i64, status: CampaignStatus) -> Result<Campaign> {
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET status = ?
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Campaign", id));
    }

    get_campaign(pool, id).await
}

/// Overwrite the aggregate counters, e.g. when importing historical numbers.
pub async fn set_call_counts(
    pool: &SqlitePool,
    id: i64,
    total_calls: i64,
    answered_calls: i64,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET total_calls = ?, answered_calls = ?
        WHERE id = ?
        "#,
    )
    .bind(total_calls)
    .bind(answered_calls)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Campaign", id));
    }

    Ok(())
}

/// Fold one delivered call result into the campaign statistics.
///
/// `duration` values of zero or less are not counted towards the mean.
pub async fn record_call_result(
    pool: &SqlitePool,
    id: i64,
    new_call: bool,
    newly_answered: bool,
    duration: Option<i64>,
) -> Result<Campaign> {
    let duration = duration.filter(|d| *d > 0);
    let sample = i64::from(duration.is_some());
    let duration = duration.unwrap_or(0);

    // Every expression reads the pre-update row.
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET total_calls = total_calls + ?,
            answered_calls = answered_calls + ?,
            average_duration = CASE
                WHEN ? = 1 THEN (average_duration * duration_samples + ?) / (duration_samples + 1)
                ELSE average_duration
            END,
            duration_samples = duration_samples + ?
        WHERE id = ?
        "#,
    )
    .bind(i64::from(new_call))
    .bind(i64::from(newly_answered))
    .bind(sample)
    .bind(duration as f64)
    .bind(sample)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Campaign", id));
    }

    get_campaign(pool, id).await
}

/// Delete a campaign and, by cascade, its calls and targets.
pub async fn delete_campaign(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM campaigns
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Campaign", id));
    }

    Ok(())
}

/// Count a user's campaigns grouped by status.
pub async fn count_by_status(
    pool: &SqlitePool,
    owner_user_id: &str,
) -> Result<Vec<(CampaignStatus, i64)>> {
    let rows = sqlx::query_as::<_, (CampaignStatus, i64)>(
        r#"
        SELECT status, COUNT(*) as count
        FROM campaigns
        WHERE owner_user_id = ?
        GROUP BY status
        ORDER BY count DESC
        "#,
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Aggregate call totals across a user's campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Default, sqlx::FromRow)]
pub struct CallTotals {
    pub total_calls: i64,
    pub answered_calls: i64,
    /// Mean over all delivered durations, weighted by sample count.
    pub average_duration: f64,
}

/// Sum call counters and combine per-campaign means.
pub async fn call_totals(pool: &SqlitePool, owner_user_id: &str) -> Result<CallTotals> {
    let totals = sqlx::query_as::<_, CallTotals>(
        r#"
        SELECT
            COALESCE(SUM(total_calls), 0) AS total_calls,
            COALESCE(SUM(answered_calls), 0) AS answered_calls,
            COALESCE(
                SUM(average_duration * duration_samples) / NULLIF(SUM(duration_samples), 0),
                0.0
            ) AS average_duration
        FROM campaigns
        WHERE owner_user_id = ?
        "#,
    )
    .bind(owner_user_id)
    .fetch_one(pool)
    .await?;

    Ok(totals)
}
