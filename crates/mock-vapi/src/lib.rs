//! Mock assistant registries for testing sync and dispatch.
//!
//! - `InMemoryRegistry` - shared vector with an offline switch
//! - `DelayedRegistry` - wraps another registry with artificial latency
//!
//! For the real API, use the `vapi-client` crate.
//!
//! # Example
//!
//! ```rust
//! use mock_vapi::{AssistantRegistry, InMemoryRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = InMemoryRegistry::with_assistants(vec![
//!         InMemoryRegistry::assistant("asst-1", "Default", Some("user-1")),
//!     ]);
//!
//!     let assistants = registry.list().await;
//!     assert_eq!(assistants[0].name, "Default");
//! }
//! ```

mod delayed;
mod memory;

pub use vapi_client::{AssistantRegistry, NewRemoteAssistant, RemoteAssistant};

pub use delayed::DelayedRegistry;
pub use memory::InMemoryRegistry;
