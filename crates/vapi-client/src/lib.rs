//! Vapi assistant registry client.
//!
//! This crate wraps the registry's REST API:
//!
//! - `GET /assistant` - list
//! - `GET /assistant/{id}` - fetch
//! - `POST /assistant` - create
//! - `DELETE /assistant/{id}` - delete
//!
//! Every request carries a bearer token and a fixed timeout (8 seconds by
//! default). Through the [`AssistantRegistry`] trait, failures never surface
//! as errors: they are logged and turned into an empty list, `None` or
//! `false`.
//!
//! # Example
//!
//! ```no_run
//! use vapi_client::{AssistantRegistry, VapiClient, VapiConfig};
//!
//! # async fn example() -> Result<(), vapi_client::VapiError> {
//! let client = VapiClient::new(VapiConfig::new("https://api.vapi.ai", "secret"))?;
//!
//! for assistant in client.list().await {
//!     println!("{} ({})", assistant.name, assistant.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use client::VapiClient;
pub use config::{VapiConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::VapiError;
pub use registry::AssistantRegistry;
pub use types::{ModelConfig, NewRemoteAssistant, RemoteAssistant, VoiceConfig};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
