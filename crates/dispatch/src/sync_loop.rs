//! Background reconciliation loop.

use std::time::Duration;

use database::{assistant, Database};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sync::Reconciler;

/// Default interval between passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15);
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Clamp a configured interval to the supported range.
pub fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_SYNC_INTERVAL, MAX_SYNC_INTERVAL)
}

/// Handle to a running sync loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct SyncLoop {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl SyncLoop {
    /// Spawn the loop. Each tick reconciles every known owner in turn.
    ///
    /// Passes run back to back on one task, so ticks never overlap.
    pub fn spawn(db: Database, reconciler: Reconciler, interval: Duration) -> Self {
        let interval = clamp_interval(interval);
        info!(interval_secs = interval.as_secs(), "Starting assistant sync loop");

        let handle = tokio::spawn(async move {
            loop {
                run_pass(&db, &reconciler).await;
                tokio::time::sleep(interval).await;
            }
        });

        Self { handle, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the loop. An in-flight registry call is dropped with the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for SyncLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Reconcile every user that owns an assistant or a campaign.
///
/// The registry is listed once per pass and shared by every owner.
pub async fn run_pass(db: &Database, reconciler: &Reconciler) {
    let owners = match assistant::list_known_owners(db.pool()).await {
        Ok(owners) => owners,
        Err(err) => {
            warn!(error = %err, "Failed to list owners for sync");
            return;
        }
    };

    if owners.is_empty() {
        return;
    }

    let remote = reconciler.fetch_remote().await;
    debug!(owners = owners.len(), fetched = remote.len(), "Running assistant sync pass");
    for owner in &owners {
        reconciler.sync_user_with(&remote, owner).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{campaign, NewCampaign};
    use mock_vapi::{DelayedRegistry, InMemoryRegistry};
    use std::sync::Arc;

    #[test]
    fn test_clamp_interval() {
        assert_eq!(clamp_interval(Duration::from_secs(1)), MIN_SYNC_INTERVAL);
        assert_eq!(clamp_interval(Duration::from_secs(15)), Duration::from_secs(15));
        assert_eq!(clamp_interval(Duration::from_secs(300)), MAX_SYNC_INTERVAL);
    }

    #[tokio::test]
    async fn test_pass_covers_campaign_owners() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        campaign::create_campaign(
            db.pool(),
            &NewCampaign {
                owner_user_id: "user-1".to_string(),
                name: "Launch".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let registry = InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant(
            "r-1",
            "Sales Bot",
            Some("user-1"),
        )]);
        let reconciler = Reconciler::new(db.clone(), Arc::new(registry));

        run_pass(&db, &reconciler).await;
        let cached = assistant::list_assistants(db.pool(), "user-1").await.unwrap();
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_and_abort() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let reconciler = Reconciler::new(db.clone(), Arc::new(InMemoryRegistry::new()));

        let sync_loop = SyncLoop::spawn(db, reconciler, Duration::from_secs(60));
        assert_eq!(sync_loop.interval(), MAX_SYNC_INTERVAL);
        assert!(sync_loop.is_running());

        sync_loop.abort();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sync_loop.is_running());
    }

    #[tokio::test]
    async fn test_abort_drops_in_flight_pass() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        campaign::create_campaign(
            db.pool(),
            &NewCampaign {
                owner_user_id: "user-1".to_string(),
                name: "Launch".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let inner = InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant(
            "r-1",
            "Sales Bot",
            Some("user-1"),
        )]);
        let registry = DelayedRegistry::with_millis(inner, 300);
        let reconciler = Reconciler::new(db.clone(), Arc::new(registry));

        let sync_loop = SyncLoop::spawn(db.clone(), reconciler, DEFAULT_SYNC_INTERVAL);
        tokio::time::sleep(Duration::from_millis(30)).await;
        sync_loop.abort();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let cached = assistant::list_assistants(db.pool(), "user-1").await.unwrap();
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn test_pass_lists_registry_once() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        for owner in ["user-1", "user-2", "user-3"] {
            campaign::create_campaign(
                db.pool(),
                &NewCampaign {
                    owner_user_id: owner.to_string(),
                    name: "Launch".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let registry = InMemoryRegistry::with_assistants(vec![
            InMemoryRegistry::assistant("r-1", "Sales Bot", Some("user-1")),
            InMemoryRegistry::assistant("r-2", "Support Agent", Some("user-2")),
        ]);
        let reconciler = Reconciler::new(db.clone(), Arc::new(registry.clone()));

        run_pass(&db, &reconciler).await;
        assert_eq!(registry.list_calls(), 1);
        assert_eq!(assistant::list_assistants(db.pool(), "user-1").await.unwrap().len(), 1);
        assert_eq!(assistant::list_assistants(db.pool(), "user-2").await.unwrap().len(), 1);
        assert!(assistant::list_assistants(db.pool(), "user-3").await.unwrap().is_empty());
    }
}
