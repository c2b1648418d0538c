//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use dispatch::{
    CampaignActions, DispatchConfig, Dispatcher, Reconciler, SelectionStore, WebhookSink,
};
use vapi_client::AssistantRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Assistant registry.
    pub registry: Arc<dyn AssistantRegistry>,
    /// Per-user selected assistants.
    pub selections: Arc<SelectionStore>,
    /// Campaign lifecycle and call actions.
    pub campaigns: CampaignActions,
    /// Registry to cache reconciliation.
    pub reconciler: Reconciler,
}

impl AppState {
    /// Wire the dispatcher, selection store and reconciler around one database.
    pub fn new(
        db: Database,
        registry: Arc<dyn AssistantRegistry>,
        sink: Arc<dyn WebhookSink>,
        dispatch_config: DispatchConfig,
    ) -> Self {
        let selections = Arc::new(SelectionStore::new(db.clone()));
        let dispatcher = Dispatcher::new(registry.clone(), sink, dispatch_config)
            .with_webhook_log(db.clone());
        let campaigns = CampaignActions::new(db.clone(), dispatcher, selections.clone());
        let reconciler = Reconciler::new(db.clone(), registry.clone());

        Self {
            db,
            registry,
            selections,
            campaigns,
            reconciler,
        }
    }
}
