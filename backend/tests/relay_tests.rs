//! AI relay endpoint tests
//!
//! The gateway is a local axum server so these run offline.

mod common;

use axum::http::{Method, StatusCode};
use common::{FakeGateway, TestApp};
use serde_json::{json, Value};

const FALLBACK: &str = "I apologize, but I encountered an error. Please try again.";

fn history(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "role": if i % 2 == 0 { "user" } else { "assistant" },
                    "content": format!("turn {}", i)
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn test_diagnose_plant_parses_upstream_answer() {
    let gateway = FakeGateway::start(
        StatusCode::OK,
        "Disease: Leaf Blight\nConfidence: 78%\n\n6. **Treatment Plan**:\n- Copper fungicide",
    )
    .await;
    let app = TestApp::with_gateway(&gateway.endpoint);

    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/diagnose-plant",
            None,
            Some(json!({ "imageUrl": "https://img.example/leaf.jpg" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disease"], "Leaf Blight");
    assert_eq!(body["confidence"], 78);
    assert!(body["diagnosis"].as_str().unwrap().starts_with("Disease: Leaf Blight"));
    assert!(body["recommendations"]
        .as_str()
        .unwrap()
        .contains("Copper fungicide"));

    let sent = gateway.last_request();
    assert_eq!(sent["model"], "google/gemini-2.5-flash");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(
        sent["messages"][1]["content"][1]["image_url"]["url"],
        "https://img.example/leaf.jpg"
    );
    assert_eq!(
        gateway.auth_headers.lock().unwrap().last().map(String::as_str),
        Some("Bearer test-key")
    );
}

#[tokio::test]
async fn test_diagnose_plant_upstream_failure() {
    let gateway = FakeGateway::start(StatusCode::SERVICE_UNAVAILABLE, "").await;
    let app = TestApp::with_gateway(&gateway.endpoint);

    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/diagnose-plant",
            None,
            Some(json!({ "imageUrl": "https://img.example/leaf.jpg" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert!(body.get("disease").is_none());
}

#[tokio::test]
async fn test_diagnose_plant_malformed_body() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/diagnose-plant",
            None,
            Some(json!({ "image": 42 })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_saathi_forwards_last_five_turns() {
    let gateway = FakeGateway::start(StatusCode::OK, "Namaste! Jai Kisan.").await;
    let app = TestApp::with_gateway(&gateway.endpoint);

    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/saathi-ai",
            None,
            Some(json!({ "message": "When to sow wheat?", "conversationHistory": history(20) })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Namaste! Jai Kisan." }));

    let sent = gateway.last_request();
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[1]["content"], "turn 15");
    assert_eq!(messages[5]["content"], "turn 19");
    assert_eq!(messages[6], json!({ "role": "user", "content": "When to sow wheat?" }));
    let temperature = sent["temperature"].as_f64().unwrap();
    assert!((temperature - 1.1).abs() < 1e-4);
}

#[tokio::test]
async fn test_saathi_upstream_failure_returns_fallback() {
    let gateway = FakeGateway::start(StatusCode::TOO_MANY_REQUESTS, "").await;
    let app = TestApp::with_gateway(&gateway.endpoint);

    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/saathi-ai",
            None,
            Some(json!({ "message": "Hello", "conversationHistory": [] })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["response"], FALLBACK);
    assert!(body["error"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn test_saathi_unreachable_gateway() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/functions/v1/saathi-ai",
            None,
            Some(json!({ "message": "Hello" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["response"], FALLBACK);
}

#[tokio::test]
async fn test_preflight_is_empty_ok() {
    let app = TestApp::new();
    let (status, body) = app
        .request(Method::OPTIONS, "/functions/v1/saathi-ai", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}
