mod common;

use axum::http::StatusCode;
use chat_gateway::services::MockInferenceClient;
use common::{body_json, test_config, TestApp};
use serde_json::Value;
use std::sync::Arc;

fn app() -> TestApp {
    TestApp::new(
        test_config(),
        Arc::new(MockInferenceClient::responding(Value::Null)),
    )
}

#[tokio::test]
async fn health_check_returns_status_and_uptime() {
    let app = app();

    let res = app.get("/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body = body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chat-gateway-test");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();

    let res = app.get("/.well-known/openapi.json", None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert!(body["paths"]["/chat"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let res = app().get("/nope", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["error"], "Route not found");
}
