use std::sync::Arc;

use super::{HistoryStore, InferenceClient, ServiceError};
use crate::models::ChatRecord;

/// Relays messages to the inference API and records each exchange.
#[derive(Clone)]
pub struct ChatService {
    inference: Arc<dyn InferenceClient>,
    history: Arc<dyn HistoryStore>,
}

impl ChatService {
    pub fn new(inference: Arc<dyn InferenceClient>, history: Arc<dyn HistoryStore>) -> Self {
        Self { inference, history }
    }

    /// Get a reply for `message` and append the exchange to the user's
    /// history. Nothing is recorded when the upstream call fails.
    pub async fn chat(&self, username: &str, message: String) -> Result<ChatRecord, ServiceError> {
        if message.is_empty() {
            return Err(ServiceError::EmptyMessage);
        }

        let reply = self.inference.complete(&message).await?;
        let record = ChatRecord::new(message, reply);
        self.history.append(username, record.clone()).await?;

        tracing::info!(
            username = %username,
            reply_len = record.reply.len(),
            "Chat exchange recorded"
        );
        Ok(record)
    }

    pub async fn history(&self, username: &str) -> Result<Vec<ChatRecord>, ServiceError> {
        self.history.list(username).await
    }
}
