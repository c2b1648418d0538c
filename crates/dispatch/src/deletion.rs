//! Assistant deletion across the registry, the local cache and the selection.

use database::{assistant, Database};
use serde::Serialize;
use tracing::{info, warn};
use vapi_client::AssistantRegistry;

use crate::error::Result;
use crate::selection::SelectionStore;

/// Per-step results of a deletion. Steps do not roll each other back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// `None` when the assistant was never published.
    pub remote_deleted: Option<bool>,
    pub local_deleted: bool,
    pub selection_cleared: bool,
}

impl DeletionReport {
    /// Every attempted step succeeded.
    pub fn is_complete(&self) -> bool {
        self.remote_deleted != Some(false) && self.local_deleted
    }
}

/// Delete a user's assistant: registry copy first, then the cached row,
/// then the stored selection if it pointed at this assistant.
///
/// Fails only when the assistant does not exist or belongs to someone else.
pub async fn delete_assistant(
    db: &Database,
    registry: &dyn AssistantRegistry,
    selections: &SelectionStore,
    user_id: &str,
    local_id: &str,
) -> Result<DeletionReport> {
    let target = assistant::get_owned_assistant(db.pool(), user_id, local_id).await?;
    let mut report = DeletionReport::default();

    if let Some(remote_id) = target.remote_assistant_id.as_deref() {
        let deleted = registry.delete(remote_id).await;
        if !deleted {
            warn!(local_id, remote_id, "Registry did not delete assistant");
        }
        report.remote_deleted = Some(deleted);
    }

    match assistant::delete_assistant(db.pool(), local_id).await {
        Ok(()) => report.local_deleted = true,
        Err(err) => warn!(local_id, error = %err, "Failed to delete cached assistant"),
    }

    let selected = selections.get(user_id).await;
    if selected.is_some_and(|s| s.refers_to(&target)) {
        match selections.clear(user_id).await {
            Ok(cleared) => report.selection_cleared = cleared,
            Err(err) => warn!(user_id, error = %err, "Failed to clear assistant selection"),
        }
    }

    info!(
        local_id,
        remote_deleted = ?report.remote_deleted,
        local_deleted = report.local_deleted,
        selection_cleared = report.selection_cleared,
        "Assistant deleted"
    );
    Ok(report)
}
