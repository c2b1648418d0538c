//! Campaign calling dashboard server.

use std::sync::Arc;

use dashboard_web::{app, AppState, Config};
use database::Database;
use dispatch::{HttpWebhookSink, SyncLoop};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vapi_client::VapiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting dashboard server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Registry client and automation webhook
    let registry = Arc::new(VapiClient::new(config.vapi.clone())?);
    let sink = Arc::new(HttpWebhookSink::new(&config.dispatch));
    info!(webhook = %sink.url(), "Automation webhook configured");

    // Build application state
    let state = AppState::new(db.clone(), registry, sink, config.dispatch.clone());

    // Keep the local assistant cache in step with the registry
    let sync_loop = SyncLoop::spawn(db.clone(), state.reconciler.clone(), config.sync_interval);

    // Start server
    info!(addr = %config.addr, "Dashboard server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    sync_loop.abort();
    db.close().await;

    Ok(())
}
