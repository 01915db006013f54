//! Shared setup for chat-gateway integration tests.
//!
//! Requests go through the full router via `oneshot`; the inference API is
//! either a `MockInferenceClient` or a throwaway axum server on localhost.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chat_gateway::{
    build_router,
    config::{
        Environment, GatewayConfig, InferenceConfig, JwtConfig, RateLimitConfig, SecurityConfig,
    },
    services::InferenceClient,
    AppState,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "chat-gateway-test".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        jwt: JwtConfig {
            secret: Secret::new(TEST_JWT_SECRET.to_string()),
            expiry_minutes: 120,
        },
        inference: InferenceConfig {
            api_key: Some(Secret::new("hf_test_key".to_string())),
            api_url: "http://127.0.0.1:9/unused".to_string(),
            timeout_seconds: 5,
        },
        rate_limit: RateLimitConfig {
            requests: 30,
            window_seconds: 60,
        },
        security: SecurityConfig {
            allowed_origins: vec!["*".to_string()],
            trust_proxy_headers: false,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new(config: GatewayConfig, inference: Arc<dyn InferenceClient>) -> Self {
        let state = AppState::in_memory(config, inference);
        let router = build_router(state.clone()).expect("Failed to build router");
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register and log in, returning the session token.
    pub async fn signed_in(&self, username: &str, password: &str) -> String {
        let credentials = serde_json::json!({ "username": username, "password": password });

        let res = self.post_json("/register", credentials.clone(), None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = self.post_json("/login", credentials, None).await;
        assert_eq!(res.status(), StatusCode::OK);

        body_json(res).await["token"]
            .as_str()
            .expect("login response has a token")
            .to_string()
    }
}

/// Attach a TCP peer address the way `into_make_service_with_connect_info`
/// does for real connections.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().expect("valid socket address");
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn body_json(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is JSON")
}

/// Serve `router` on an ephemeral localhost port and return its address.
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream stub");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// A localhost address with nothing listening on it.
pub async fn unused_local_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    listener.local_addr().unwrap()
}
