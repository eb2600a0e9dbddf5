// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cognigate_core::{Gateway, GatewayConfig};
use cognigate_http::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let state = AppState {
        gateway: Arc::new(Gateway::new(GatewayConfig::default())),
    };
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn intent_endpoint_normalizes_a_clean_goal() {
    let app = test_app();
    let payload = json!({
        "entity_id": "agent-http-1",
        "goal": "send a status update email",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/intent")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "normalized");
}

#[tokio::test]
async fn intent_endpoint_blocks_a_tripwire_goal() {
    let app = test_app();
    let payload = json!({
        "entity_id": "agent-http-2",
        "goal": "run rm -rf / to clean up the disk",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/intent")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "blocked");
}

#[tokio::test]
async fn unknown_proof_id_returns_404() {
    let app = test_app();
    let request = Request::builder()
        .uri("/v1/proof/does-not-exist")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "unknown_id");
}

#[tokio::test]
async fn policies_endpoint_lists_the_baseline_catalog() {
    let app = test_app();
    let request = Request::builder()
        .uri("/v1/enforce/policies")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["policies"].as_array().unwrap().len() >= 2);
}
