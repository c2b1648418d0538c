//! In-memory registry.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vapi_client::{AssistantRegistry, ModelConfig, NewRemoteAssistant, RemoteAssistant, VoiceConfig};

/// A registry backed by a vector.
///
/// Clones share state. Switching it offline makes every call behave like a
/// failed request (empty list, `None`, `false`) without touching the contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    assistants: Arc<RwLock<Vec<RemoteAssistant>>>,
    offline: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given assistants.
    pub fn with_assistants(assistants: Vec<RemoteAssistant>) -> Self {
        Self {
            assistants: Arc::new(RwLock::new(assistants)),
            ..Self::default()
        }
    }

    /// Build a minimal assistant with an owner in its metadata.
    pub fn assistant(id: &str, name: &str, owner: Option<&str>) -> RemoteAssistant {
        RemoteAssistant {
            id: id.to_string(),
            name: name.to_string(),
            owner_user_id: owner.map(str::to_string),
            ..RemoteAssistant::default()
        }
    }

    /// Add an assistant.
    pub async fn insert(&self, assistant: RemoteAssistant) {
        self.assistants.write().await.push(assistant);
    }

    /// Current contents, ignoring the offline flag.
    pub async fn snapshot(&self) -> Vec<RemoteAssistant> {
        self.assistants.read().await.clone()
    }

    /// Simulate an unreachable registry.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `list` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantRegistry for InMemoryRegistry {
    async fn list(&self) -> Vec<RemoteAssistant> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline() {
            return Vec::new();
        }
        self.snapshot().await
    }

    async fn get(&self, id: &str) -> Option<RemoteAssistant> {
        if self.is_offline() {
            return None;
        }
        self.assistants
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    async fn create(&self, assistant: &NewRemoteAssistant) -> Option<RemoteAssistant> {
        if self.is_offline() {
            return None;
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = RemoteAssistant {
            id: format!("mock-assistant-{}", n),
            name: assistant.name.clone(),
            first_message: Some(assistant.first_message.clone()),
            system_prompt: Some(assistant.system_prompt.clone()),
            model: ModelConfig {
                provider: Some(assistant.model_provider.clone()),
                model: Some(assistant.model.clone()),
            },
            voice: VoiceConfig {
                provider: Some(assistant.voice_provider.clone()),
                voice_id: Some(assistant.voice_id.clone()),
            },
            owner_user_id: Some(assistant.owner_user_id.clone()),
            created_at: None,
        };

        self.insert(created.clone()).await;
        Some(created)
    }

    async fn delete(&self, id: &str) -> bool {
        if self.is_offline() {
            return false;
        }
        let mut assistants = self.assistants.write().await;
        let before = assistants.len();
        assistants.retain(|a| a.id != id);
        assistants.len() != before
    }
}
