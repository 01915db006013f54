//! Hugging Face Inference API client.
//!
//! Posts a single-turn conversational payload and normalizes whichever
//! response layout the hosted model produces.

use super::{reply::normalize_reply, InferenceClient, ProviderError};
use crate::config::InferenceConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

/// Request body understood by conversational models.
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: ConversationInputs<'a>,
}

/// Only the current message is sent; earlier turns stay empty.
#[derive(Debug, Serialize)]
struct ConversationInputs<'a> {
    past_user_inputs: Vec<String>,
    generated_responses: Vec<String>,
    text: &'a str,
}

pub struct HuggingFaceClient {
    client: Client,
    api_url: String,
    api_key: Option<Secret<String>>,
}

impl HuggingFaceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl InferenceClient for HuggingFaceClient {
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::NotConfigured("AI API key not configured".to_string()))?;

        let request = InferenceRequest {
            inputs: ConversationInputs {
                past_user_inputs: Vec::new(),
                generated_responses: Vec::new(),
                text: message,
            },
        };

        tracing::debug!(
            url = %self.api_url,
            message_len = message.len(),
            "Sending request to inference API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                tracing::error!(
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read inference API error body"
                );
                ProviderError::Network(format!(
                    "Failed to read error body (status {}): {}",
                    status.as_u16(),
                    e
                ))
            })?;
            tracing::error!(status = status.as_u16(), body = %body, "Inference API error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
            })?;

        Ok(normalize_reply(&body))
    }
}
