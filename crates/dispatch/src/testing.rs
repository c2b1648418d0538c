//! Test doubles for the dispatch seams.
//!
//! Compiled for this crate's own tests and, through the `test-util`
//! feature, for downstream test suites.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::webhook::{WebhookDelivery, WebhookSink};

/// A sink that keeps every payload in memory and answers with a fixed status.
///
/// Clones share the recorded payloads.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    payloads: Arc<Mutex<Vec<Value>>>,
    status_code: u16,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    /// A sink that accepts everything with `200 OK`.
    pub fn new() -> Self {
        Self::with_status(200)
    }

    /// A sink that answers every delivery with `status_code`.
    pub fn with_status(status_code: u16) -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
            status_code,
        }
    }

    /// Payloads delivered so far.
    pub fn payloads(&self) -> Vec<Value> {
        match self.payloads.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, payload: &Value) -> WebhookDelivery {
        match self.payloads.lock() {
            Ok(mut guard) => guard.push(payload.clone()),
            Err(poisoned) => poisoned.into_inner().push(payload.clone()),
        }

        if (200..300).contains(&self.status_code) {
            WebhookDelivery::ok(self.status_code)
        } else {
            WebhookDelivery {
                status_code: Some(self.status_code),
                error: Some(format!("webhook returned {}", self.status_code)),
            }
        }
    }
}
