//! SQLite persistence layer for Collowop.
//!
//! This crate provides async database operations for assistants, campaigns,
//! clients, client groups, call records and webhook logs using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::NewClient, client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:collowop.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a client
//!     let new = NewClient {
//!         owner_user_id: "user-1".to_string(),
//!         name: "Maria Souza".to_string(),
//!         phone: "+5511999999999".to_string(),
//!         ..Default::default()
//!     };
//!     client::create_client(db.pool(), &new).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod call;
pub mod campaign;
pub mod campaign_client;
pub mod client;
pub mod client_group;
pub mod error;
pub mod models;
pub mod selection;
pub mod validation;
pub mod webhook_log;

pub use campaign::CallTotals;
pub use error::{DatabaseError, Result};
pub use models::{
    Assistant, AssistantStatus, AssistantUpdate, Call, CallUpdate, Campaign, CampaignStatus,
    Client, ClientGroup, NewAssistant, NewCampaign, NewClient, NewWebhookLog, SelectionRecord,
    WebhookDirection, WebhookLog,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn new_client(owner: &str, name: &str, phone: &str) -> NewClient {
        NewClient {
            owner_user_id: owner.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    async fn seed_campaign(db: &Database, owner: &str) -> Campaign {
        campaign::create_campaign(
            db.pool(),
            &NewCampaign {
                owner_user_id: owner.to_string(),
                name: "Black Friday".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_assistant_round_trip() {
        let db = test_db().await;

        let created = assistant::create_assistant(
            db.pool(),
            &NewAssistant {
                owner_user_id: "user-1".to_string(),
                name: "Sales Bot".to_string(),
                first_message: "Olá!".to_string(),
                system_prompt: "Seja cordial".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let fetched = assistant::get_assistant(db.pool(), &created.local_id)
            .await
            .unwrap();
        assert_eq!(fetched.name, "Sales Bot");
        assert_eq!(fetched.first_message, "Olá!");
        assert_eq!(fetched.system_prompt, "Seja cordial");
        assert_eq!(fetched.status, AssistantStatus::Pending);
        assert!(!fetched.published);
        assert!(fetched.remote_assistant_id.is_none());
    }

    #[tokio::test]
    async fn test_assistant_ownership_and_publish() {
        let db = test_db().await;

        let created = assistant::create_assistant(
            db.pool(),
            &NewAssistant {
                owner_user_id: "user-1".to_string(),
                name: "Support".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let other = assistant::get_owned_assistant(db.pool(), "user-2", &created.local_id).await;
        assert!(matches!(other, Err(DatabaseError::NotFound { .. })));

        let published = assistant::mark_published(db.pool(), &created.local_id, "remote-9")
            .await
            .unwrap();
        assert!(published.published);
        assert_eq!(published.status, AssistantStatus::Ready);

        let found = assistant::find_by_remote_id(db.pool(), "remote-9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.local_id, created.local_id);

        let updated = assistant::update_assistant(
            db.pool(),
            &created.local_id,
            &AssistantUpdate {
                first_message: Some("Oi".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Support");
        assert_eq!(updated.first_message, "Oi");

        assistant::delete_assistant(db.pool(), &created.local_id)
            .await
            .unwrap();
        assert!(assistant::find_by_remote_id(db.pool(), "remote-9")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_client_crud() {
        let db = test_db().await;

        let created = client::create_client(
            db.pool(),
            &new_client("user-1", "Maria", "+55 11 99999-9999"),
        )
        .await
        .unwrap();
        assert_eq!(created.phone, "+5511999999999");

        let invalid = client::create_client(db.pool(), &new_client("user-1", "Bad", "12345")).await;
        assert!(matches!(invalid, Err(DatabaseError::Invalid(_))));

        let mut edit = new_client("user-1", "Maria Souza", "+5511999999999");
        edit.email = Some("maria@example.com".to_string());
        let updated = client::update_client(db.pool(), created.id, &edit).await.unwrap();
        assert_eq!(updated.name, "Maria Souza");
        assert_eq!(updated.email.as_deref(), Some("maria@example.com"));

        // Another user cannot edit it
        let foreign = client::update_client(
            db.pool(),
            created.id,
            &new_client("user-2", "Hijack", "+5511999999999"),
        )
        .await;
        assert!(matches!(foreign, Err(DatabaseError::NotFound { .. })));

        assert_eq!(client::list_clients(db.pool(), "user-1").await.unwrap().len(), 1);
        client::delete_client(db.pool(), created.id).await.unwrap();
        assert_eq!(client::count_clients(db.pool(), "user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_group_membership() {
        let db = test_db().await;
        let maria = client::create_client(db.pool(), &new_client("u", "Maria", "+5511999999999"))
            .await
            .unwrap();
        let joao = client::create_client(db.pool(), &new_client("u", "João", "+5511988888888"))
            .await
            .unwrap();

        let group = client_group::create_group(db.pool(), "u", "VIP", None)
            .await
            .unwrap();
        client_group::add_member(db.pool(), group.id, maria.id).await.unwrap();
        client_group::add_member(db.pool(), group.id, joao.id).await.unwrap();

        let duplicate = client_group::add_member(db.pool(), group.id, maria.id).await;
        assert!(matches!(duplicate, Err(DatabaseError::AlreadyExists { .. })));

        let groups = client_group::list_groups_with_member_counts(db.pool(), "u")
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1, 2);

        let camp = seed_campaign(&db, "u").await;
        assert_eq!(
            campaign_client::add_group(db.pool(), camp.id, group.id).await.unwrap(),
            2
        );
        assert!(!campaign_client::add_client(db.pool(), camp.id, maria.id)
            .await
            .unwrap());

        client_group::remove_member(db.pool(), group.id, joao.id).await.unwrap();
        let members = client_group::list_members(db.pool(), group.id).await.unwrap();
        assert_eq!(members, vec![maria]);
    }

    #[tokio::test]
    async fn test_campaign_running_mean() {
        let db = test_db().await;
        let camp = seed_campaign(&db, "user-1").await;
        campaign::set_call_counts(db.pool(), camp.id, 10, 4).await.unwrap();

        for duration in [60, 90, 120] {
            campaign::record_call_result(db.pool(), camp.id, false, false, Some(duration))
                .await
                .unwrap();
        }

        let camp = campaign::get_campaign(db.pool(), camp.id).await.unwrap();
        assert_eq!(camp.total_calls, 10);
        assert_eq!(camp.answered_calls, 4);
        assert_eq!(camp.duration_samples, 3);
        assert!((camp.average_duration - 90.0).abs() < f64::EPSILON);

        // Zero durations do not move the mean
        let camp = campaign::record_call_result(db.pool(), camp.id, true, false, Some(0))
            .await
            .unwrap();
        assert_eq!(camp.total_calls, 11);
        assert!((camp.average_duration - 90.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_campaign_status_any_transition() {
        let db = test_db().await;
        let camp = seed_campaign(&db, "user-1").await;
        assert_eq!(camp.status, CampaignStatus::Draft);

        let stopped = campaign::update_status(db.pool(), camp.id, CampaignStatus::Stopped)
            .await
            .unwrap();
        assert_eq!(stopped.status, CampaignStatus::Stopped);

        let counts = campaign::count_by_status(db.pool(), "user-1").await.unwrap();
        assert_eq!(counts, vec![(CampaignStatus::Stopped, 1)]);
    }

    #[tokio::test]
    async fn test_ensure_call_once_per_pair() {
        let db = test_db().await;
        let camp = seed_campaign(&db, "user-1").await;
        let maria = client::create_client(db.pool(), &new_client("user-1", "Maria", "+5511999999999"))
            .await
            .unwrap();

        let (first, created) = call::ensure_call(db.pool(), camp.id, maria.id, Some("asst-1"))
            .await
            .unwrap();
        assert!(created);
        let (second, created) = call::ensure_call(db.pool(), camp.id, maria.id, None)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);

        let updated = call::update_call(
            db.pool(),
            first.id,
            &CallUpdate {
                status: Some("completed".to_string()),
                duration: Some(42),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.duration, 42);
        assert_eq!(updated.assistant_id.as_deref(), Some("asst-1"));

        let history = call::list_calls(db.pool(), "user-1", Some(camp.id), 50)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert!(call::list_calls(db.pool(), "user-2", None, 50)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_selection_upsert_and_clear() {
        let db = test_db().await;

        selection::upsert_selection(db.pool(), "user-1", r#"{"id":"a"}"#)
            .await
            .unwrap();
        selection::upsert_selection(db.pool(), "user-1", r#"{"id":"b"}"#)
            .await
            .unwrap();

        let stored = selection::get_selection(db.pool(), "user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.assistant_json, r#"{"id":"b"}"#);

        assert!(selection::clear_selection(db.pool(), "user-1").await.unwrap());
        assert!(!selection::clear_selection(db.pool(), "user-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_webhook_log_and_owners() {
        let db = test_db().await;
        let camp = seed_campaign(&db, "owner-a").await;
        assistant::create_assistant(
            db.pool(),
            &NewAssistant {
                owner_user_id: "owner-b".to_string(),
                name: "Bot".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        webhook_log::record(
            db.pool(),
            &NewWebhookLog {
                direction: WebhookDirection::Outbound,
                action: "start_campaign".to_string(),
                campaign_id: Some(camp.id),
                payload: "{}".to_string(),
                status_code: Some(200),
                success: true,
                error: None,
            },
        )
        .await
        .unwrap();

        let logs = webhook_log::list_recent(db.pool(), Some(camp.id), 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].direction, WebhookDirection::Outbound);

        let owners = assistant::list_known_owners(db.pool()).await.unwrap();
        assert_eq!(owners, vec!["owner-a".to_string(), "owner-b".to_string()]);
    }
}
