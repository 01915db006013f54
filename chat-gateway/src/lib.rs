pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::{any::Any, sync::Arc, time::Instant};

use axum::{
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use service_core::error::{AppError, ErrorResponse};
use service_core::middleware::{
    rate_limit::{
        create_ip_rate_limiter, ip_rate_limit_middleware, ClientIpSource, IpRateLimit,
        IpRateLimiter,
    },
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::config::GatewayConfig;
use crate::services::{
    AuthService, ChatService, HistoryStore, InMemoryHistoryStore, InMemoryUserStore,
    InferenceClient, SessionService, UserStore,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::chat::chat,
        handlers::chat::history,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::HealthResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::chat::ChatRequest,
            dtos::chat::ChatResponse,
            dtos::chat::HistoryResponse,
            models::ChatRecord,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration and session tokens"),
        (name = "Chat", description = "Model conversations and history"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub sessions: SessionService,
    pub auth_service: AuthService,
    pub chat_service: ChatService,
    pub rate_limiter: IpRateLimiter,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        users: Arc<dyn UserStore>,
        history: Arc<dyn HistoryStore>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        let sessions = SessionService::new(&config.jwt);
        let rate_limiter = create_ip_rate_limiter(
            config.rate_limit.requests,
            config.rate_limit.window_seconds,
        );

        Self {
            auth_service: AuthService::new(users, history.clone(), sessions.clone()),
            chat_service: ChatService::new(inference, history),
            sessions,
            rate_limiter,
            started_at: Instant::now(),
            config,
        }
    }

    /// State backed by the process-local stores.
    pub fn in_memory(config: GatewayConfig, inference: Arc<dyn InferenceClient>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            inference,
        )
    }
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::history))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = cors_layer(&state.config.security.allowed_origins)?;
    let ip_source = if state.config.security.trust_proxy_headers {
        ClientIpSource::ForwardedFor
    } else {
        ClientIpSource::PeerAddress
    };

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(protected_routes)
        .fallback(route_not_found)
        .with_state(state.clone())
        // Every route counts against the per-IP window, before authentication
        .layer(from_fn_with_state(
            IpRateLimit::new(state.rate_limiter.clone(), ip_source),
            ip_rate_limit_middleware,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(cors);

    Ok(app)
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, AppError> {
    let allow_origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

async fn route_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}

/// Last-resort handler: a panicking request still gets a JSON 500.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(details = %details, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            details: Some(details),
        }),
    )
        .into_response()
}
