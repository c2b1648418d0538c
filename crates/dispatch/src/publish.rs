//! Publishing locally drafted assistants to the registry.

use database::{assistant, Assistant, AssistantStatus, Database};
use serde::Serialize;
use tracing::{info, warn};
use vapi_client::{AssistantRegistry, NewRemoteAssistant};

use crate::config::{DEFAULT_MODEL, DEFAULT_MODEL_PROVIDER, DEFAULT_VOICE, DEFAULT_VOICE_PROVIDER};
use crate::error::Result;

/// Result of a publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    /// The cached assistant after the attempt.
    pub assistant: Assistant,
    pub published: bool,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Registry body for a cached assistant, tagged with its owner.
pub fn remote_body(local: &Assistant) -> NewRemoteAssistant {
    NewRemoteAssistant {
        name: local.name.clone(),
        first_message: local.first_message.clone(),
        system_prompt: local.system_prompt.clone(),
        model_provider: DEFAULT_MODEL_PROVIDER.to_string(),
        model: non_empty(&local.model).unwrap_or(DEFAULT_MODEL).to_string(),
        voice_provider: non_empty(&local.voice)
            .unwrap_or(DEFAULT_VOICE_PROVIDER)
            .to_string(),
        voice_id: local
            .voice_id
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(DEFAULT_VOICE)
            .to_string(),
        owner_user_id: local.owner_user_id.clone(),
    }
}

/// Create the assistant in the registry and link it locally.
///
/// On success the row gets the registry ID and becomes `ready`; on failure it
/// is marked `failed`. Only ownership problems and database errors are `Err`.
pub async fn publish_assistant(
    db: &Database,
    registry: &dyn AssistantRegistry,
    user_id: &str,
    local_id: &str,
) -> Result<PublishOutcome> {
    let local = assistant::get_owned_assistant(db.pool(), user_id, local_id).await?;

    match registry.create(&remote_body(&local)).await {
        Some(created) => {
            let linked = assistant::mark_published(db.pool(), local_id, &created.id).await?;
            info!(local_id, remote_id = %created.id, "Assistant published");
            Ok(PublishOutcome {
                assistant: linked,
                published: true,
            })
        }
        None => {
            assistant::set_status(db.pool(), local_id, AssistantStatus::Failed).await?;
            warn!(local_id, "Registry rejected assistant");
            Ok(PublishOutcome {
                assistant: assistant::get_assistant(db.pool(), local_id).await?,
                published: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::NewAssistant;
    use mock_vapi::InMemoryRegistry;

    async fn draft(db: &Database) -> Assistant {
        assistant::create_assistant(
            db.pool(),
            &NewAssistant {
                owner_user_id: "user-1".to_string(),
                name: "Sales Bot".to_string(),
                system_prompt: "Seja cordial".to_string(),
                first_message: "Olá!".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[test]
    fn test_remote_body_defaults() {
        let local = Assistant {
            local_id: "l-1".to_string(),
            remote_assistant_id: None,
            name: "Sales Bot".to_string(),
            system_prompt: "Seja cordial".to_string(),
            first_message: "Olá!".to_string(),
            model: String::new(),
            voice: " ".to_string(),
            voice_id: None,
            owner_user_id: "user-1".to_string(),
            published: false,
            status: AssistantStatus::Pending,
            created_at: "2026-01-01 00:00:00".to_string(),
        };
        let body = remote_body(&local);
        assert_eq!(body.model, DEFAULT_MODEL);
        assert_eq!(body.voice_provider, DEFAULT_VOICE_PROVIDER);
        assert_eq!(body.voice_id, DEFAULT_VOICE);
        assert_eq!(body.owner_user_id, "user-1");
    }

    #[tokio::test]
    async fn test_publish_links_remote_id() {
        let db = test_db().await;
        let registry = InMemoryRegistry::new();
        let local = draft(&db).await;

        let outcome = publish_assistant(&db, &registry, "user-1", &local.local_id)
            .await
            .unwrap();
        assert!(outcome.published);
        assert_eq!(outcome.assistant.status, AssistantStatus::Ready);
        assert!(outcome.assistant.published);

        let remote = registry.snapshot().await;
        assert_eq!(remote.len(), 1);
        assert_eq!(outcome.assistant.remote_assistant_id.as_deref(), Some(remote[0].id.as_str()));
        assert!(remote[0].is_owned_by("user-1"));
    }

    #[tokio::test]
    async fn test_publish_failure_marks_failed() {
        let db = test_db().await;
        let registry = InMemoryRegistry::new();
        registry.set_offline(true);
        let local = draft(&db).await;

        let outcome = publish_assistant(&db, &registry, "user-1", &local.local_id)
            .await
            .unwrap();
        assert!(!outcome.published);
        assert_eq!(outcome.assistant.status, AssistantStatus::Failed);
        assert!(outcome.assistant.remote_assistant_id.is_none());
    }

    #[tokio::test]
    async fn test_publish_requires_ownership() {
        let db = test_db().await;
        let local = draft(&db).await;
        let err = publish_assistant(&db, &InMemoryRegistry::new(), "user-2", &local.local_id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
