//! Per-user selected assistant.
//!
//! The selection is owned by [`SelectionStore`] and handed to the dispatcher
//! explicitly; nothing reads it behind the caller's back.

use std::collections::HashMap;

use database::selection as selection_store;
use database::{Assistant, Database};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::Result;

/// The assistant a user picked in the training view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAssistant {
    /// Registry ID, if the assistant has been published.
    pub id: Option<String>,
    /// Local cache ID.
    pub local_id: Option<String>,
    pub name: String,
}

impl SelectedAssistant {
    /// Whether this selection refers to the given cached assistant.
    pub fn refers_to(&self, assistant: &Assistant) -> bool {
        self.local_id.as_deref() == Some(assistant.local_id.as_str())
            || (self.id.is_some() && self.id == assistant.remote_assistant_id)
    }
}

impl From<&Assistant> for SelectedAssistant {
    fn from(assistant: &Assistant) -> Self {
        Self {
            id: assistant.remote_assistant_id.clone(),
            local_id: Some(assistant.local_id.clone()),
            name: assistant.name.clone(),
        }
    }
}

/// Selection storage, backed by SQLite with an in-memory cache.
pub struct SelectionStore {
    cache: RwLock<HashMap<String, Option<SelectedAssistant>>>,
    database: Database,
}

impl SelectionStore {
    pub fn new(database: Database) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            database,
        }
    }

    /// Get a user's selection. Unreadable stored JSON counts as no selection.
    pub async fn get(&self, user_id: &str) -> Option<SelectedAssistant> {
        if let Some(cached) = self.cache.read().await.get(user_id) {
            return cached.clone();
        }

        let loaded = match selection_store::get_selection(self.database.pool(), user_id).await {
            Ok(Some(record)) => match serde_json::from_str(&record.assistant_json) {
                Ok(selected) => Some(selected),
                Err(err) => {
                    warn!(user_id, error = %err, "Ignoring unreadable assistant selection");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                // Not cached, so the next read tries again.
                warn!(user_id, error = %err, "Failed to load assistant selection");
                return None;
            }
        };

        self.cache
            .write()
            .await
            .insert(user_id.to_string(), loaded.clone());
        loaded
    }

    /// Replace a user's selection.
    pub async fn set(&self, user_id: &str, selected: SelectedAssistant) -> Result<()> {
        let json = serde_json::to_string(&selected)?;
        selection_store::upsert_selection(self.database.pool(), user_id, &json).await?;
        self.cache
            .write()
            .await
            .insert(user_id.to_string(), Some(selected));
        Ok(())
    }

    /// Clear a user's selection. Returns true if one was stored.
    pub async fn clear(&self, user_id: &str) -> Result<bool> {
        let removed = selection_store::clear_selection(self.database.pool(), user_id).await?;
        self.cache.write().await.insert(user_id.to_string(), None);
        Ok(removed)
    }
}
