//! Route handlers for the dashboard API.

pub mod analytics;
pub mod campaigns;
pub mod clients;
pub mod health;
pub mod history;
pub mod training;
pub mod webhooks;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Clients page
        .route(
            "/api/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/api/groups",
            get(clients::list_groups).post(clients::create_group),
        )
        .route("/api/groups/:id", delete(clients::delete_group))
        .route(
            "/api/groups/:id/members",
            get(clients::list_members).post(clients::add_member),
        )
        .route(
            "/api/groups/:id/members/:client_id",
            delete(clients::remove_member),
        )
        // Campaigns page
        .route(
            "/api/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/api/campaigns/:id",
            get(campaigns::get_campaign).delete(campaigns::delete_campaign),
        )
        .route("/api/campaigns/:id/clients", post(campaigns::add_targets))
        .route("/api/campaigns/:id/start", post(campaigns::start_campaign))
        .route("/api/campaigns/:id/pause", post(campaigns::pause_campaign))
        .route("/api/campaigns/:id/resume", post(campaigns::resume_campaign))
        .route("/api/campaigns/:id/stop", post(campaigns::stop_campaign))
        .route("/api/campaigns/:id/call", post(campaigns::call_client))
        // Training page
        .route(
            "/api/training/assistants",
            get(training::list_assistants).post(training::create_assistant),
        )
        .route(
            "/api/training/assistants/:id",
            get(training::get_assistant)
                .put(training::update_assistant)
                .delete(training::delete),
        )
        .route("/api/training/assistants/:id/publish", post(training::publish))
        .route("/api/training/assistants/:id/select", post(training::select))
        .route("/api/training/selected", get(training::selected))
        .route("/api/training/sync", post(training::sync))
        // History and analytics pages
        .route("/api/history", get(history::history))
        .route("/api/analytics", get(analytics::analytics))
        // Calling system callbacks
        .route("/webhooks/call-completed", post(webhooks::call_completed))
}
