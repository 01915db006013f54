//! Client side of the hosted text-generation API.
//!
//! `InferenceClient` is the seam the chat service depends on; the
//! Hugging Face implementation talks HTTP, the mock answers in-process.

pub mod huggingface;
pub mod mock;
pub mod reply;

pub use huggingface::HuggingFaceClient;
pub use mock::MockInferenceClient;
pub use reply::{normalize_reply, ReplyShape, FALLBACK_REPLY};

use async_trait::async_trait;
use thiserror::Error;

/// Error type for inference calls.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    NotConfigured(String),

    /// The API answered with a non-success status.
    #[error("Inference API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send one user message and return the model's reply text.
    async fn complete(&self, message: &str) -> Result<String, ProviderError>;
}
