use service_core::axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

use super::inference::ProviderError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Message is required.")]
    EmptyMessage,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            // Registration and login failures all surface as 400 with a
            // distinct message per cause.
            ServiceError::MissingCredentials
            | ServiceError::UserAlreadyExists
            | ServiceError::UserNotFound
            | ServiceError::InvalidPassword
            | ServiceError::EmptyMessage => {
                AppError::BadRequest(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::InvalidToken => AppError::Unauthorized(anyhow::anyhow!(err.to_string())),
            ServiceError::Provider(ProviderError::NotConfigured(msg)) => {
                AppError::NotConfigured(msg)
            }
            ServiceError::Provider(ProviderError::Upstream { status, body }) => AppError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message: "AI API error".to_string(),
                details: body,
            },
            ServiceError::Provider(e) => AppError::InternalError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
