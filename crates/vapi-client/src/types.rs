//! Assistant types and the decode boundary for registry responses.
//!
//! The registry returns `model` and `voice` either as plain strings or as
//! nested objects, and carries ownership in a free-form `metadata` map. All of
//! that is normalised here, once, into [`RemoteAssistant`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model settings of a remote assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Voice settings of a remote assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub provider: Option<String>,
    pub voice_id: Option<String>,
}

/// An assistant as held by the registry, after normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAssistant {
    pub id: String,
    pub name: String,
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub model: ModelConfig,
    pub voice: VoiceConfig,
    /// Value of `metadata.user_id` (or `metadata.userId`), if any.
    pub owner_user_id: Option<String>,
    pub created_at: Option<String>,
}

impl RemoteAssistant {
    /// Whether the assistant's metadata names this user as owner.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id.as_deref() == Some(user_id)
    }

    /// Whether this user may place calls with the assistant: it is theirs,
    /// or its metadata names no owner at all.
    pub fn is_usable_by(&self, user_id: &str) -> bool {
        match self.owner_user_id.as_deref() {
            Some(owner) => owner == user_id,
            None => true,
        }
    }

    /// Decode one registry JSON object.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let raw: RawAssistant = serde_json::from_value(value)?;
        Ok(raw.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawModel {
    Name(String),
    Object {
        #[serde(default)]
        provider: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        messages: Vec<RawMessage>,
    },
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVoice {
    Name(String),
    Object {
        #[serde(default)]
        provider: Option<String>,
        #[serde(default, alias = "voiceId")]
        voice_id: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssistant {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_message: Option<String>,
    #[serde(default)]
    model: Option<RawModel>,
    #[serde(default)]
    voice: Option<RawVoice>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<RawAssistant> for RemoteAssistant {
    fn from(raw: RawAssistant) -> Self {
        let (model, system_prompt) = match raw.model {
            Some(RawModel::Name(name)) => (
                ModelConfig {
                    provider: None,
                    model: Some(name),
                },
                None,
            ),
            Some(RawModel::Object {
                provider,
                model,
                messages,
            }) => {
                let prompt = messages
                    .into_iter()
                    .find(|m| m.role == "system")
                    .and_then(|m| m.content);
                (ModelConfig { provider, model }, prompt)
            }
            None => (ModelConfig::default(), None),
        };

        let voice = match raw.voice {
            Some(RawVoice::Name(name)) => VoiceConfig {
                provider: None,
                voice_id: Some(name),
            },
            Some(RawVoice::Object { provider, voice_id }) => VoiceConfig { provider, voice_id },
            None => VoiceConfig::default(),
        };

        let owner_user_id = raw.metadata.as_ref().and_then(|meta| {
            ["user_id", "userId"]
                .iter()
                .find_map(|key| match meta.get(*key) {
                    Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                })
        });

        RemoteAssistant {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            first_message: raw.first_message,
            system_prompt,
            model,
            voice,
            owner_user_id,
            created_at: raw.created_at,
        }
    }
}

/// Decode a list response, skipping entries that do not parse.
///
/// Returns the decoded assistants and the number of skipped entries.
pub fn decode_list(value: Value) -> (Vec<RemoteAssistant>, usize) {
    let items = match value {
        Value::Array(items) => items,
        // Some deployments wrap results in {"results": [...]}
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => return (Vec::new(), 0),
        },
        _ => return (Vec::new(), 0),
    };

    let mut skipped = 0;
    let assistants = items
        .into_iter()
        .filter_map(|item| match RemoteAssistant::from_json(item) {
            Ok(assistant) => Some(assistant),
            Err(e) => {
                skipped += 1;
                tracing::warn!(error = %e, "Skipping undecodable assistant");
                None
            }
        })
        .collect();

    (assistants, skipped)
}

/// Body for creating an assistant in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteAssistant {
    pub name: String,
    pub first_message: String,
    pub system_prompt: String,
    pub model_provider: String,
    pub model: String,
    pub voice_provider: String,
    pub voice_id: String,
    /// Stored in `metadata.user_id`.
    pub owner_user_id: String,
}

impl NewRemoteAssistant {
    /// Registry JSON for `POST /assistant`.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "firstMessage": self.first_message,
            "model": {
                "provider": self.model_provider,
                "model": self.model,
                "messages": [
                    { "role": "system", "content": self.system_prompt }
                ]
            },
            "voice": {
                "provider": self.voice_provider,
                "voiceId": self.voice_id
            },
            "metadata": {
                "user_id": self.owner_user_id
            }
        })
    }
}
