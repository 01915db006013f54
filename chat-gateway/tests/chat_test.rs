mod common;

use axum::{http::StatusCode, routing::post, Json, Router};
use chat_gateway::{
    config::InferenceConfig,
    services::{HuggingFaceClient, MockInferenceClient},
};
use common::{body_json, spawn_upstream, test_config, unused_local_addr, TestApp};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;

fn client_at(api_url: String) -> HuggingFaceClient {
    HuggingFaceClient::new(&InferenceConfig {
        api_key: Some(Secret::new("hf_test_key".to_string())),
        api_url,
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn chat_round_trip_through_upstream_is_recorded() {
    let upstream = Router::new().route(
        "/models/test",
        post(|| async { Json(json!([{ "generated_text": "hi there" }])) }),
    );
    let addr = spawn_upstream(upstream).await;

    let client = client_at(format!("http://{}/models/test", addr));
    let app = TestApp::new(test_config(), Arc::new(client));
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({ "reply": "hi there" }));

    let res = app.get("/history", Some(&token)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let history = body_json(res).await["history"].clone();
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "hello");
    assert_eq!(records[0]["reply"], "hi there");
    assert!(records[0]["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn history_is_per_user_and_in_order() {
    let app = TestApp::new(
        test_config(),
        Arc::new(MockInferenceClient::responding(
            json!({ "generated_text": "ok" }),
        )),
    );
    let alice = app.signed_in("alice", "pw").await;
    let bob = app.signed_in("bob", "pw").await;

    for message in ["first", "second", "third"] {
        let res = app
            .post_json("/chat", json!({ "message": message }), Some(&alice))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let history = body_json(app.get("/history", Some(&alice)).await).await;
    let messages: Vec<&str> = history["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, ["first", "second", "third"]);

    let history = body_json(app.get("/history", Some(&bob)).await).await;
    assert_eq!(history, json!({ "history": [] }));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let client = Arc::new(MockInferenceClient::responding(json!({ "generated_text": "x" })));
    let app = TestApp::new(test_config(), client.clone());
    let token = app.signed_in("alice", "pw").await;

    for body in [json!({}), json!({ "message": "" })] {
        let res = app.post_json("/chat", body, Some(&token)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Message is required.");
    }

    assert!(client.received().is_empty());
}

#[tokio::test]
async fn upstream_error_status_is_passed_through() {
    let app = TestApp::new(
        test_config(),
        Arc::new(MockInferenceClient::failing(503, "model is loading")),
    );
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(res).await,
        json!({ "error": "AI API error", "details": "model is loading" })
    );

    let history = body_json(app.get("/history", Some(&token)).await).await;
    assert_eq!(history, json!({ "history": [] }));
}

#[tokio::test]
async fn missing_api_key_is_a_server_error() {
    let app = TestApp::new(test_config(), Arc::new(MockInferenceClient::unconfigured()));
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await["error"], "AI API key not configured");
}

#[tokio::test]
async fn unrecognized_reply_falls_back() {
    let app = TestApp::new(
        test_config(),
        Arc::new(MockInferenceClient::responding(json!({ "unexpected": true }))),
    );
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = body_json(res).await;
    assert_eq!(body["reply"], "Sorry, I couldn't generate a reply.");
}

#[tokio::test]
async fn unparsable_upstream_reply_is_an_internal_error() {
    let upstream = Router::new().route("/models/test", post(|| async { "not json" }));
    let addr = spawn_upstream(upstream).await;

    let app = TestApp::new(
        test_config(),
        Arc::new(client_at(format!("http://{}/models/test", addr))),
    );
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(res).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Failed to parse response"));

    let history = body_json(app.get("/history", Some(&token)).await).await;
    assert_eq!(history, json!({ "history": [] }));
}

#[tokio::test]
async fn unreachable_upstream_is_an_internal_error() {
    let addr = unused_local_addr().await;
    let app = TestApp::new(
        test_config(),
        Arc::new(client_at(format!("http://{}/models/test", addr))),
    );
    let token = app.signed_in("alice", "pw").await;

    let res = app
        .post_json("/chat", json!({ "message": "hello" }), Some(&token))
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(res).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].is_string());
}
