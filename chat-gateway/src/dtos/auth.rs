use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Missing fields deserialize as empty strings so both cases share one message.

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    #[schema(example = "alice")]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    #[schema(example = "alice")]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}
