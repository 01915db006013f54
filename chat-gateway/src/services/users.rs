use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::ServiceError;
use crate::models::User;

/// Credential storage keyed by username.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new user. Fails with `UserAlreadyExists` when the name is taken.
    async fn insert(&self, user: User) -> Result<(), ServiceError>;

    async fn find(&self, username: &str) -> Result<Option<User>, ServiceError>;

    async fn exists(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.find(username).await?.is_some())
    }
}

/// Process-local user table. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), ServiceError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(ServiceError::UserAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn find(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users.get(username).map(|user| user.clone()))
    }

    async fn exists(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.users.contains_key(username))
    }
}
