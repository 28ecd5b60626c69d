mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn post(uri: &str, body: &'static str) -> (StatusCode, Value) {
    let response = common::test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_inbound_returns_audio_stream_script() {
    let (status, body) = post("/inbound", "{}").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "AudioStream": {
                "location": { "uri": "wss://relay.example.com/stream" },
                "contentType": "audio/mulaw;rate=8000",
                "actionUrl": "https://hooks.example.com/callback",
                "metadata": ["testing"]
            }
        }])
    );
}

#[tokio::test]
async fn test_callback_acknowledges_json_object() {
    let (status, body) = post("/callback", r#"{"callId":"CA123","callStatus":"completed"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_callback_rejects_invalid_json() {
    let (status, body) = post("/callback", "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Invalid JSON" }));
}

#[tokio::test]
async fn test_openapi_document_lists_control_plane_paths() {
    let response = common::test_router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(doc["paths"]["/inbound"]["post"].is_object());
    assert!(doc["paths"]["/callback"]["post"].is_object());
}
