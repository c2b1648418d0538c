//! Assistant cache operations.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Assistant, AssistantStatus, AssistantUpdate, NewAssistant};
use crate::validation::validate_name;

/// Insert an assistant and return the stored row.
///
/// A fresh local ID is generated; `remote_assistant_id` is stored as given.
pub async fn create_assistant(pool: &SqlitePool, new: &NewAssistant) -> Result<Assistant> {
    validate_name("name", &new.name)?;

    let local_id = Uuid::new_v4().to_string();
    let status = new.status.unwrap_or(AssistantStatus::Pending);

    sqlx::query(
        r#"
        INSERT INTO assistants (
            local_id, remote_assistant_id, name, system_prompt, first_message,
            model, voice, voice_id, owner_user_id, published, status
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&local_id)
    .bind(&new.remote_assistant_id)
    .bind(new.name.trim())
    .bind(&new.system_prompt)
    .bind(&new.first_message)
    .bind(&new.model)
    .bind(&new.voice)
    .bind(&new.voice_id)
    .bind(&new.owner_user_id)
    .bind(new.published)
    .bind(status)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Assistant", &local_id))?;

    get_assistant(pool, &local_id).await
}

/// Get an assistant by local ID.
pub async fn get_assistant(pool: &SqlitePool, local_id: &str) -> Result<Assistant> {
    sqlx::query_as::<_, Assistant>(
        r#"
        SELECT local_id, remote_assistant_id, name, system_prompt, first_message,
               model, voice, voice_id, owner_user_id, published, status, created_at
        FROM assistants
        WHERE local_id = ?
        "#,
    )
    .bind(local_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Assistant", local_id))
}

/// Get an assistant by local ID, treating another user's assistant as missing.
pub async fn get_owned_assistant(
    pool: &SqlitePool,
    owner_user_id: &str,
    local_id: &str,
) -> Result<Assistant> {
    let assistant = get_assistant(pool, local_id).await?;
    if assistant.owner_user_id != owner_user_id {
        return Err(DatabaseError::not_found("Assistant", local_id));
    }
    Ok(assistant)
}

/// Find the first cached assistant with the given registry ID.
///
/// Duplicates are possible (see `sync`), so this picks the oldest row.
pub async fn find_by_remote_id(
    pool: &SqlitePool,
    remote_assistant_id: &str,
) -> Result<Option<Assistant>> {
    let assistant = sqlx::query_as::<_, Assistant>(
        r#"
        SELECT local_id, remote_assistant_id, name, system_prompt, first_message,
               model, voice, voice_id, owner_user_id, published, status, created_at
        FROM assistants
        WHERE remote_assistant_id = ?
        ORDER BY created_at, rowid
        LIMIT 1
        "#,
    )
    .bind(remote_assistant_id)
    .fetch_optional(pool)
    .await?;

    Ok(assistant)
}

/// Count cached rows for a registry ID.
pub async fn count_by_remote_id(pool: &SqlitePool, remote_assistant_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM assistants WHERE remote_assistant_id = ?
        "#,
    )
    .bind(remote_assistant_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List a user's assistants, newest first.
pub async fn list_assistants(pool: &SqlitePool, owner_user_id: &str) -> Result<Vec<Assistant>> {
    let assistants = sqlx::query_as::<_, Assistant>(
        r#"
        SELECT local_id, remote_assistant_id, name, system_prompt, first_message,
               model, voice, voice_id, owner_user_id, published, status, created_at
        FROM assistants
        WHERE owner_user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(assistants)
}

/// Apply an edit to an assistant's descriptive fields.
pub async fn update_assistant(
    pool: &SqlitePool,
    local_id: &str,
    update: &AssistantUpdate,
) -> Result<Assistant> {
    if let Some(name) = &update.name {
        validate_name("name", name)?;
    }

    let result = sqlx::query(
        r#"
        UPDATE assistants
        SET name = COALESCE(?, name),
            system_prompt = COALESCE(?, system_prompt),
            first_message = COALESCE(?, first_message),
            model = COALESCE(?, model),
            voice = COALESCE(?, voice),
            voice_id = COALESCE(?, voice_id)
        WHERE local_id = ?
        "#,
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(&update.system_prompt)
    .bind(&update.first_message)
    .bind(&update.model)
    .bind(&update.voice)
    .bind(&update.voice_id)
    .bind(local_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Assistant", local_id));
    }

    get_assistant(pool, local_id).await
}

/// Set the provisioning status.
pub async fn set_status(pool: &SqlitePool, local_id: &str, status: AssistantStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE assistants
        SET status = ?
        WHERE local_id = ?
        "#,
    )
    .bind(status)
    .bind(local_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Assistant", local_id));
    }

    Ok(())
}

/// Record a successful publish: link the registry ID and mark ready.
pub async fn mark_published(
    pool: &SqlitePool,
    local_id: &str,
    remote_assistant_id: &str,
) -> Result<Assistant> {
    let result = sqlx::query(
        r#"
        UPDATE assistants
        SET remote_assistant_id = ?, published = 1, status = 'ready'
        WHERE local_id = ?
        "#,
    )
    .bind(remote_assistant_id)
    .bind(local_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Assistant", local_id));
    }

    get_assistant(pool, local_id).await
}

/// Delete an assistant by local ID.
pub async fn delete_assistant(pool: &SqlitePool, local_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM assistants
        WHERE local_id = ?
        "#,
    )
    .bind(local_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Assistant", local_id));
    }

    Ok(())
}

/// List every user that owns at least one assistant or campaign.
pub async fn list_known_owners(pool: &SqlitePool) -> Result<Vec<String>> {
    let owners = sqlx::query_scalar::<_, String>(
        r#"
        SELECT owner_user_id FROM assistants
        UNION
        SELECT owner_user_id FROM campaigns
        ORDER BY 1
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(owners)
}
