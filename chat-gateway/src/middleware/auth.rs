use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{services::SessionClaims, AppState};

/// Rejects requests without a valid bearer session token and stores the
/// verified claims in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authorization token required")))?;

    let claims = state.sessions.verify(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// The authenticated caller, as established by `auth_middleware`.
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<SessionClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Session claims missing from request extensions"
            ))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
