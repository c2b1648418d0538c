//! Client (contact) CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Client, NewClient};
use crate::validation::{normalize_phone, validate_email, validate_name, validate_phone};

fn validate_client(client: &NewClient) -> Result<()> {
    validate_name("name", &client.name)?;
    validate_phone(&client.phone)?;
    if let Some(email) = client.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

fn clean_email(email: &Option<String>) -> Option<String> {
    email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// Create a client. The phone number is stored without separators.
pub async fn create_client(pool: &SqlitePool, new: &NewClient) -> Result<Client> {
    validate_client(new)?;

    let id = sqlx::query(
        r#"
        INSERT INTO clients (name, phone, email, notes, owner_user_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.name.trim())
    .bind(normalize_phone(&new.phone))
    .bind(clean_email(&new.email))
    .bind(&new.notes)
    .bind(&new.owner_user_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_client(pool, id).await
}

/// Get a client by ID.
pub async fn get_client(pool: &SqlitePool, id: i64) -> Result<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, phone, email, notes, owner_user_id, created_at
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Client", id))
}

/// Get a client, treating another user's client as missing.
pub async fn get_owned_client(pool: &SqlitePool, owner_user_id: &str, id: i64) -> Result<Client> {
    let client = get_client(pool, id).await?;
    if client.owner_user_id != owner_user_id {
        return Err(DatabaseError::not_found("Client", id));
    }
    Ok(client)
}

/// List a user's clients by name.
pub async fn list_clients(pool: &SqlitePool, owner_user_id: &str) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, phone, email, notes, owner_user_id, created_at
        FROM clients
        WHERE owner_user_id = ?
        ORDER BY name COLLATE NOCASE, id
        "#,
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Replace a client's editable fields.
pub async fn update_client(pool: &SqlitePool, id: i64, client: &NewClient) -> Result<Client> {
    validate_client(client)?;

    let result = sqlx::query(
        r#"
        UPDATE clients
        SET name = ?, phone = ?, email = ?, notes = ?
        WHERE id = ? AND owner_user_id = ?
        "#,
    )
    .bind(client.name.trim())
    .bind(normalize_phone(&client.phone))
    .bind(clean_email(&client.email))
    .bind(&client.notes)
    .bind(id)
    .bind(&client.owner_user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Client", id));
    }

    get_client(pool, id).await
}

/// Delete a client by ID.
pub async fn delete_client(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM clients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Client", id));
    }

    Ok(())
}

/// Count a user's clients.
pub async fn count_clients(pool: &SqlitePool, owner_user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM clients WHERE owner_user_id = ?
        "#,
    )
    .bind(owner_user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
