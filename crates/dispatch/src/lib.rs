//! Assistant reconciliation and call dispatch for Collowop campaigns.
//!
//! This crate decides which registry assistant places or manages a call,
//! posts the result to the automation platform, and keeps the local
//! assistant cache loosely in step with the registry.
//!
//! # Architecture
//!
//! ```text
//! Campaign action (dashboard-web)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        DISPATCH                             │
//! │                                                             │
//! │  1. Update local state (campaign status, call record)       │
//! │         ↓                                                   │
//! │  2. List registry assistants                                │
//! │         ↓                                                   │
//! │  3. Resolve: request ID → request name → selection          │
//! │              → first available → fallback ID                │
//! │         ↓                                                   │
//! │  4. Attach model / voice / language                         │
//! │         ↓                                                   │
//! │  5. POST {automation}/webhook/collowop (8s, no retry)       │
//! │         ↓                                                   │
//! │  6. Report Sent / Failed                                    │
//! └─────────────────────────────────────────────────────────────┘
//!
//! SyncLoop (every 5-30s) ──→ Reconciler::sync_user(owner)
//!                              registry → local cache (status only)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dispatch::{DispatchConfig, DispatchRequest, Dispatcher, HttpWebhookSink};
//! use vapi_client::{VapiClient, VapiConfig};
//!
//! let config = DispatchConfig::from_env()?;
//! let registry = Arc::new(VapiClient::new(VapiConfig::from_env()?)?);
//! let dispatcher = Dispatcher::new(registry, Arc::new(HttpWebhookSink::new(&config)), config);
//!
//! let mut request = DispatchRequest::new("call_client", 7);
//! request.client_phone = Some("+5511999999999".to_string());
//!
//! let outcome = dispatcher.dispatch("user-1", &request, None).await;
//! println!("sent: {}", outcome.is_sent());
//! ```

pub mod campaigns;
pub mod completion;
pub mod config;
pub mod deletion;
pub mod dispatcher;
mod error;
pub mod publish;
pub mod resolve;
pub mod retry;
pub mod selection;
pub mod sync;
pub mod sync_loop;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod webhook;

pub use campaigns::{
    CallClientResult, CampaignAction, CampaignActionResult, CampaignActions, DispatchOverrides,
};
pub use completion::{process_call_completion, CallCompletion, CompletionOutcome};
pub use config::{CallSettings, DispatchConfig};
pub use deletion::{delete_assistant, DeletionReport};
pub use dispatcher::{
    DispatchFailure, DispatchOutcome, DispatchReceipt, DispatchRequest, Dispatcher, WebhookPayload,
};
pub use error::{DispatchError, Result};
pub use publish::{publish_assistant, PublishOutcome};
pub use resolve::{CallConfig, Resolution, ResolutionSource};
pub use retry::RetryPolicy;
pub use selection::{SelectedAssistant, SelectionStore};
pub use sync::{Reconciler, SyncReport};
pub use sync_loop::SyncLoop;
pub use webhook::{HttpWebhookSink, WebhookDelivery, WebhookSink};

#[cfg(any(test, feature = "test-util"))]
pub use testing::RecordingSink;
