use std::sync::Arc;

use super::{HistoryStore, ServiceError, SessionService, UserStore};
use crate::models::User;
use crate::utils::{hash_password, verify_password, Password};

/// Registration and login on top of the credential and history stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    history: Arc<dyn HistoryStore>,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        history: Arc<dyn HistoryStore>,
        sessions: SessionService,
    ) -> Self {
        Self {
            users,
            history,
            sessions,
        }
    }

    /// Create an account and its empty history.
    pub async fn register(&self, username: &str, password: Password) -> Result<(), ServiceError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::MissingCredentials);
        }

        // Cheap pre-check so a taken name does not pay for a hash; the
        // insert below is still the authoritative uniqueness check.
        if self.users.exists(username).await? {
            return Err(ServiceError::UserAlreadyExists);
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        self.users
            .insert(User::new(username.to_string(), password_hash))
            .await?;
        self.history.init_user(username).await?;

        tracing::info!(username = %username, "User registered");
        Ok(())
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: Password) -> Result<String, ServiceError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::MissingCredentials);
        }

        let user = self
            .users
            .find(username)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &user.password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !matches {
            tracing::warn!(username = %username, "Login failed: invalid password");
            return Err(ServiceError::InvalidPassword);
        }

        let token = self.sessions.issue(username)?;
        tracing::info!(username = %username, "User logged in");
        Ok(token)
    }
}
