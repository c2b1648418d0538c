//! Per-user selected assistant storage.

use sqlx::SqlitePool;

use crate::models::SelectionRecord;
use crate::Result;

/// Store the selection for a user, replacing any previous one.
pub async fn upsert_selection(pool: &SqlitePool, user_id: &str, assistant_json: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO selected_assistants (user_id, assistant_json)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            assistant_json = excluded.assistant_json,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(assistant_json)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the stored selection for a user.
pub async fn get_selection(pool: &SqlitePool, user_id: &str) -> Result<Option<SelectionRecord>> {
    let record = sqlx::query_as::<_, SelectionRecord>(
        r#"
        SELECT user_id, assistant_json, updated_at
        FROM selected_assistants
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Clear a user's selection. Returns true if one was stored.
pub async fn clear_selection(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM selected_assistants
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
