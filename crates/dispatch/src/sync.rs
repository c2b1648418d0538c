//! Reconciliation of the local assistant cache with the registry.

use std::sync::Arc;

use database::{assistant, AssistantStatus, Database, NewAssistant};
use serde::Serialize;
use tracing::{debug, info, warn};
use vapi_client::{AssistantRegistry, RemoteAssistant};

use crate::retry::RetryPolicy;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Assistants returned by the registry.
    pub fetched: usize,
    /// Of those, owned by the user.
    pub owned: usize,
    /// New local rows.
    pub inserted: usize,
    /// Existing rows whose status was brought to `ready`.
    pub status_updated: usize,
    /// Existing rows left as they were.
    pub unchanged: usize,
    /// Assistants skipped after every attempt failed.
    pub failed: usize,
}

/// Mirrors a user's registry assistants into the local cache.
///
/// Local edits to names and prompts win; only status is reconciled. The
/// lookup-then-insert is not transactional, so two concurrent passes for the
/// same user can both insert a row for one registry ID.
#[derive(Clone)]
pub struct Reconciler {
    db: Database,
    registry: Arc<dyn AssistantRegistry>,
    retry: RetryPolicy,
}

impl Reconciler {
    pub fn new(db: Database, registry: Arc<dyn AssistantRegistry>) -> Self {
        Self {
            db,
            registry,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the full registry list once, for reuse across several users.
    pub async fn fetch_remote(&self) -> Vec<RemoteAssistant> {
        self.registry.list().await
    }

    /// Run one pass for `user_id`. Failures are logged and counted, never returned.
    pub async fn sync_user(&self, user_id: &str) -> SyncReport {
        let remote = self.fetch_remote().await;
        self.sync_user_with(&remote, user_id).await
    }

    /// Reconcile `user_id` against an already fetched registry list.
    pub async fn sync_user_with(&self, remote: &[RemoteAssistant], user_id: &str) -> SyncReport {
        let mut report = SyncReport {
            fetched: remote.len(),
            ..SyncReport::default()
        };

        for remote_assistant in remote.iter().filter(|a| a.is_owned_by(user_id)) {
            report.owned += 1;
            self.reconcile_one(user_id, remote_assistant, &mut report)
                .await;
        }

        if report.inserted > 0 || report.status_updated > 0 || report.failed > 0 {
            info!(
                user_id,
                fetched = report.fetched,
                owned = report.owned,
                inserted = report.inserted,
                status_updated = report.status_updated,
                failed = report.failed,
                "Assistant sync finished"
            );
        } else {
            debug!(user_id, owned = report.owned, "Assistant sync found nothing to change");
        }

        report
    }

    async fn reconcile_one(&self, user_id: &str, remote: &RemoteAssistant, report: &mut SyncReport) {
        let pool = self.db.pool();

        let existing = match assistant::find_by_remote_id(pool, &remote.id).await {
            Ok(existing) => existing,
            Err(err) => {
                warn!(remote_id = %remote.id, error = %err, "Failed to look up cached assistant");
                report.failed += 1;
                return;
            }
        };

        match existing {
            Some(local) if local.status == AssistantStatus::Ready => report.unchanged += 1,
            Some(local) => {
                match assistant::set_status(pool, &local.local_id, AssistantStatus::Ready).await {
                    Ok(()) => report.status_updated += 1,
                    Err(err) => {
                        warn!(local_id = %local.local_id, error = %err, "Failed to update assistant status");
                        report.failed += 1;
                    }
                }
            }
            None => {
                let new = cache_row(user_id, remote);
                let inserted = self
                    .retry
                    .run("insert_assistant", |_| assistant::create_assistant(pool, &new))
                    .await;
                match inserted {
                    Ok(row) => {
                        debug!(remote_id = %remote.id, local_id = %row.local_id, "Cached registry assistant");
                        report.inserted += 1;
                    }
                    Err(err) => {
                        warn!(
                            remote_id = %remote.id,
                            attempts = self.retry.max_attempts,
                            error = %err,
                            "Giving up on caching registry assistant"
                        );
                        report.failed += 1;
                    }
                }
            }
        }
    }
}

/// Map a registry assistant to a local row.
fn cache_row(user_id: &str, remote: &RemoteAssistant) -> NewAssistant {
    NewAssistant {
        owner_user_id: user_id.to_string(),
        remote_assistant_id: Some(remote.id.clone()),
        name: remote.name.clone(),
        system_prompt: remote.system_prompt.clone().unwrap_or_default(),
        first_message: remote.first_message.clone().unwrap_or_default(),
        model: remote.model.model.clone().unwrap_or_default(),
        voice: remote.voice.provider.clone().unwrap_or_default(),
        voice_id: remote.voice.voice_id.clone(),
        published: true,
        status: Some(AssistantStatus::Ready),
    }
}
