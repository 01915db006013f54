//! In-process inference client for tests and local runs.

use super::{reply::normalize_reply, InferenceClient, ProviderError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

enum MockBehavior {
    Respond(Value),
    Fail { status: u16, body: String },
    Unconfigured,
}

/// Answers every message from a canned upstream body, so the reply goes
/// through the same normalization as a real response.
pub struct MockInferenceClient {
    behavior: MockBehavior,
    received: Mutex<Vec<String>>,
}

impl MockInferenceClient {
    /// Pretend the API returned `body` with a 200.
    pub fn responding(body: Value) -> Self {
        Self::with_behavior(MockBehavior::Respond(body))
    }

    /// Pretend the API returned a non-success status.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail {
            status,
            body: body.into(),
        })
    }

    /// Behave like a client with no API key.
    pub fn unconfigured() -> Self {
        Self::with_behavior(MockBehavior::Unconfigured)
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Messages seen so far, oldest first.
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        if let Ok(mut messages) = self.received.lock() {
            messages.push(message.to_string());
        }

        match &self.behavior {
            MockBehavior::Respond(body) => Ok(normalize_reply(body)),
            MockBehavior::Fail { status, body } => Err(ProviderError::Upstream {
                status: *status,
                body: body.clone(),
            }),
            MockBehavior::Unconfigured => Err(ProviderError::NotConfigured(
                "AI API key not configured".to_string(),
            )),
        }
    }
}
