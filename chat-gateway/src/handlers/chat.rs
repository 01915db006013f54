use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        chat::{ChatRequest, ChatResponse, HistoryResponse},
        ErrorResponse,
    },
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Send a message to the model
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model reply", body = ChatResponse),
        (status = 400, description = "Message is missing or empty", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Inference API key not configured", body = ErrorResponse),
        (status = "default", description = "Upstream API error", body = ErrorResponse)
    ),
    tag = "Chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .chat_service
        .chat(user.username(), req.message)
        .await?;

    Ok(Json(ChatResponse {
        reply: record.reply,
    }))
}

/// List the caller's past exchanges, oldest first
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Chat history", body = HistoryResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    tag = "Chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let history = state.chat_service.history(user.username()).await?;
    Ok(Json(HistoryResponse { history }))
}
