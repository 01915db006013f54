use async_trait::async_trait;
use dashmap::DashMap;

use super::ServiceError;
use crate::models::ChatRecord;

/// Per-user, append-only chat history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Create an empty history for `username`. Idempotent.
    async fn init_user(&self, username: &str) -> Result<(), ServiceError>;

    /// Append a record. Fails with `UserNotFound` if the user has no history.
    async fn append(&self, username: &str, record: ChatRecord) -> Result<(), ServiceError>;

    /// Records in insertion order; empty when the user has none.
    async fn list(&self, username: &str) -> Result<Vec<ChatRecord>, ServiceError>;
}

#[derive(Default)]
pub struct InMemoryHistoryStore {
    histories: DashMap<String, Vec<ChatRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a history list.
    pub fn user_count(&self) -> usize {
        self.histories.len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn init_user(&self, username: &str) -> Result<(), ServiceError> {
        self.histories.entry(username.to_string()).or_default();
        Ok(())
    }

    async fn append(&self, username: &str, record: ChatRecord) -> Result<(), ServiceError> {
        let mut history = self
            .histories
            .get_mut(username)
            .ok_or(ServiceError::UserNotFound)?;
        history.push(record);
        Ok(())
    }

    async fn list(&self, username: &str) -> Result<Vec<ChatRecord>, ServiceError> {
        Ok(self
            .histories
            .get(username)
            .map(|history| history.clone())
            .unwrap_or_default())
    }
}
