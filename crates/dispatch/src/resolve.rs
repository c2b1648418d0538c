//! Assistant resolution and call-config precedence.
//!
//! Resolution walks a fixed chain against the *current* registry list, so a
//! stale or deleted ID is never used:
//!
//! 1. explicit registry ID from the request
//! 2. name from the request (case-insensitive, substring either way)
//! 3. the user's selected assistant, by ID then by name
//! 4. the first registry assistant
//! 5. the fallback ID, if it still exists

use serde::Serialize;
use vapi_client::RemoteAssistant;

use crate::config::{CallSettings, DEFAULT_LANGUAGE, DEFAULT_MODEL, DEFAULT_VOICE};
use crate::selection::SelectedAssistant;

/// Which step of the chain produced the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    RequestId,
    RequestName,
    SelectedId,
    SelectedName,
    FirstAvailable,
    Fallback,
}

/// The assistant chosen for a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub assistant: RemoteAssistant,
    pub source: ResolutionSource,
}

/// Assistant hints carried by a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssistantHints<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Case-insensitive match where either name may contain the other.
pub fn name_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.trim().to_lowercase();
    let wanted = wanted.trim().to_lowercase();
    if candidate.is_empty() || wanted.is_empty() {
        return false;
    }
    candidate.contains(&wanted) || wanted.contains(&candidate)
}

fn by_id<'r>(remote: &'r [RemoteAssistant], id: &str) -> Option<&'r RemoteAssistant> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    remote.iter().find(|a| a.id == id)
}

fn by_name<'r>(remote: &'r [RemoteAssistant], name: &str) -> Option<&'r RemoteAssistant> {
    remote.iter().find(|a| name_matches(&a.name, name))
}

/// Walk the resolution chain. `None` means no assistant is available.
pub fn resolve_assistant(
    remote: &[RemoteAssistant],
    hints: AssistantHints<'_>,
    selected: Option<&SelectedAssistant>,
    fallback_id: &str,
) -> Option<Resolution> {
    let found = |assistant: &RemoteAssistant, source| {
        Some(Resolution {
            assistant: assistant.clone(),
            source,
        })
    };

    if let Some(assistant) = hints.id.and_then(|id| by_id(remote, id)) {
        return found(assistant, ResolutionSource::RequestId);
    }

    if let Some(assistant) = hints.name.and_then(|name| by_name(remote, name)) {
        return found(assistant, ResolutionSource::RequestName);
    }

    if let Some(selected) = selected {
        if let Some(assistant) = selected.id.as_deref().and_then(|id| by_id(remote, id)) {
            return found(assistant, ResolutionSource::SelectedId);
        }
        if let Some(assistant) = by_name(remote, &selected.name) {
            return found(assistant, ResolutionSource::SelectedName);
        }
    }

    if let Some(assistant) = remote.first() {
        return found(assistant, ResolutionSource::FirstAvailable);
    }

    // Reached only with an empty list, so the fallback can never validate
    // here; kept so the chain stays correct if step 4 is ever narrowed.
    by_id(remote, fallback_id).and_then(|assistant| found(assistant, ResolutionSource::Fallback))
}

/// Model, voice and language attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallConfig {
    pub model: String,
    pub voice: String,
    pub language: String,
}

/// Per-field values supplied by the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedConfig<'a> {
    pub model: Option<&'a str>,
    pub voice: Option<&'a str>,
    pub language: Option<&'a str>,
}

fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

/// Pick each field: request, then assistant, then stored settings, then default.
pub fn resolve_call_config(
    requested: RequestedConfig<'_>,
    assistant: Option<&RemoteAssistant>,
    settings: &CallSettings,
) -> CallConfig {
    let assistant_model = assistant.and_then(|a| a.model.model.as_deref());
    let assistant_voice = assistant.and_then(|a| a.voice.voice_id.as_deref());

    CallConfig {
        model: first_present(&[requested.model, assistant_model, settings.model.as_deref()])
            .unwrap_or(DEFAULT_MODEL)
            .to_string(),
        voice: first_present(&[requested.voice, assistant_voice, settings.voice.as_deref()])
            .unwrap_or(DEFAULT_VOICE)
            .to_string(),
        // Assistants carry no language of their own.
        language: first_present(&[requested.language, settings.language.as_deref()])
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
    }
}
