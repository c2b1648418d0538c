//! Campaign calling dashboard API for Collowop.
//!
//! Serves JSON for the clients, campaigns, training, history and analytics
//! pages, accepts call-completion webhooks, and runs the background
//! assistant sync loop (see `main.rs`).

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::WebError;
pub use state::AppState;

/// Router with every route, tracing and state attached.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
