pub mod auth;
pub mod chat;

use serde::Serialize;
use utoipa::ToSchema;

/// Error body shape, as produced by `service_core::error::AppError`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid or expired token")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Seconds since the process started.
    #[schema(example = 12.5)]
    pub uptime: f64,
    #[schema(example = "chat-gateway")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}
