//! The assistant registry trait.

use async_trait::async_trait;

use crate::types::{NewRemoteAssistant, RemoteAssistant};

/// Read/write access to the remote assistant registry.
///
/// Implementations never fail loudly: transport problems are logged and turn
/// into an empty list, `None` or `false`. Callers therefore cannot tell an
/// empty registry from a failed fetch.
#[async_trait]
pub trait AssistantRegistry: Send + Sync {
    /// List every assistant visible to the API key.
    async fn list(&self) -> Vec<RemoteAssistant>;

    /// Fetch one assistant.
    async fn get(&self, id: &str) -> Option<RemoteAssistant>;

    /// Create an assistant, returning it as stored by the registry.
    async fn create(&self, assistant: &NewRemoteAssistant) -> Option<RemoteAssistant>;

    /// Delete an assistant. Returns true on a 2xx response.
    async fn delete(&self, id: &str) -> bool;
}
