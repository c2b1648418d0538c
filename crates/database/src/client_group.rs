//! Client groups and memberships.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Client, ClientGroup};
use crate::validation::validate_name;

/// Create a group.
pub async fn create_group(
    pool: &SqlitePool,
    owner_user_id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<ClientGroup> {
    validate_name("name", name)?;

    let id = sqlx::query(
        r#"
        INSERT INTO client_groups (name, description, owner_user_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(name.trim())
    .bind(description)
    .bind(owner_user_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_group(pool, id).await
}

/// Get a group by ID.
pub async fn get_group(pool: &SqlitePool, id: i64) -> Result<ClientGroup> {
    sqlx::query_as::<_, ClientGroup>(
        r#"
        SELECT id, name, description, owner_user_id, created_at
        FROM client_groups
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("ClientGroup", id))
}

/// Get a group, treating another user's group as missing.
pub async fn get_owned_group(pool: &SqlitePool, owner_user_id: &str, id: i64) -> Result<ClientGroup> {
    let group = get_group(pool, id).await?;
    if group.owner_user_id != owner_user_id {
        return Err(DatabaseError::not_found("ClientGroup", id));
    }
    Ok(group)
}

/// List a user's groups with their member counts.
pub async fn list_groups_with_member_counts(
    pool: &SqlitePool,
    owner_user_id: &str,
) -> Result<Vec<(ClientGroup, i64)>> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, String, String, i64)>(
        r#"
        SELECT g.id, g.name, g.description, g.owner_user_id, g.created_at,
               COUNT(m.client_id) as member_count
        FROM client_groups g
        LEFT JOIN client_group_members m ON m.group_id = g.id
        WHERE g.owner_user_id = ?
        GROUP BY g.id
        ORDER BY g.name COLLATE NOCASE
        "#,
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, description, owner_user_id, created_at, count)| {
            (
                ClientGroup {
                    id,
                    name,
                    description,
                    owner_user_id,
                    created_at,
                },
                count,
            )
        })
        .collect())
}

/// Delete a group; memberships go with it.
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM client_groups
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("ClientGroup", id));
    }

    Ok(())
}

/// Add a client to a group.
pub async fn add_member(pool: &SqlitePool, group_id: i64, client_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO client_group_members (group_id, client_id)
        VALUES (?, ?)
        "#,
    )
    .bind(group_id)
    .bind(client_id)
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_insert(e, "ClientGroupMember", format!("{}/{}", group_id, client_id))
    })?;

    Ok(())
}

/// Remove a client from a group.
pub async fn remove_member(pool: &SqlitePool, group_id: i64, client_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM client_group_members
        WHERE group_id = ? AND client_id = ?
        "#,
    )
    .bind(group_id)
    .bind(client_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(
            "ClientGroupMember",
            format!("{}/{}", group_id, client_id),
        ));
    }

    Ok(())
}

/// List the clients in a group.
pub async fn list_members(pool: &SqlitePool, group_id: i64) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT c.id, c.name, c.phone, c.email, c.notes, c.owner_user_id, c.created_at
        FROM clients c
        JOIN client_group_members m ON m.client_id = c.id
        WHERE m.group_id = ?
        ORDER BY c.name COLLATE NOCASE, c.id
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}
