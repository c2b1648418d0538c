//! Delayed registry - wraps another registry with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use vapi_client::{AssistantRegistry, NewRemoteAssistant, RemoteAssistant};

/// A registry that sleeps before delegating every call.
///
/// Useful for exercising overlapping sync passes and slow-registry paths.
pub struct DelayedRegistry<R: AssistantRegistry> {
    inner: R,
    delay: Duration,
}

impl<R: AssistantRegistry> DelayedRegistry<R> {
    pub fn new(inner: R, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn with_millis(inner: R, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<R: AssistantRegistry> AssistantRegistry for DelayedRegistry<R> {
    async fn list(&self) -> Vec<RemoteAssistant> {
        sleep(self.delay).await;
        self.inner.list().await
    }

    async fn get(&self, id: &str) -> Option<RemoteAssistant> {
        sleep(self.delay).await;
        self.inner.get(id).await
    }

    async fn create(&self, assistant: &NewRemoteAssistant) -> Option<RemoteAssistant> {
        sleep(self.delay).await;
        self.inner.create(assistant).await
    }

    async fn delete(&self, id: &str) -> bool {
        sleep(self.delay).await;
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRegistry;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_list() {
        let inner =
            InMemoryRegistry::with_assistants(vec![InMemoryRegistry::assistant("a", "A", None)]);
        let registry = DelayedRegistry::with_millis(inner, 50);

        let start = Instant::now();
        let assistants = registry.list().await;

        assert_eq!(assistants.len(), 1);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
