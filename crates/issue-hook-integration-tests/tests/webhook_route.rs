//! Integration tests for serving the receiver behind an HTTP route
//!
//! These tests verify that rejections surface as their status codes and that
//! accepted deliveries return the normalized context.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_text, create_test_app, signed_request};
use issue_hook_core::ReceiverConfig;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot`

fn issue_opened() -> String {
    json!({
        "action": "opened",
        "sender": { "login": "octocat" },
        "repository": { "full_name": "org/repo" },
        "issue": {
            "number": 1347,
            "title": "Found a bug",
            "body": "I'm having a problem with this.",
            "user": { "login": "octocat" },
            "labels": [{ "name": "bug" }]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_accepted_delivery_returns_context() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default());

    // Act
    let response = app
        .oneshot(signed_request("issues", &issue_opened()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let context: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(context["event_action"], "issues.opened");
    assert_eq!(context["issue_id"], 1347);
    assert_eq!(context["issue_labels"], json!(["bug"]));
    assert_eq!(context["repo"], "org/repo");
}

#[tokio::test]
async fn test_unsigned_delivery_is_unauthorized() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-github-event", "issues")
        .body(Body::from(issue_opened()))
        .unwrap();

    // Act
    let response = app.oneshot(request).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Request missing signature");
}

#[tokio::test]
async fn test_forged_signature_is_unauthorized() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-hub-signature", "sha1=37b5229ea55afcfd53c43b5603c51b3ca273e49b")
        .header("x-github-event", "issues")
        .body(Body::from(issue_opened()))
        .unwrap();

    // Act
    let response = app.oneshot(request).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Signatures didn't match!");
}

#[tokio::test]
async fn test_malformed_and_empty_bodies_are_bad_requests() {
    for (body, message) in [("not json", "Malformed request"), ("{}", "No payload")] {
        // Arrange
        let app = create_test_app(ReceiverConfig::default());

        // Act
        let response = app.oneshot(signed_request("issues", body)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, message);
    }
}

#[tokio::test]
async fn test_discarded_event_is_forbidden() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default().with_accept_events("issue_comment"));

    // Act
    let response = app
        .oneshot(signed_request("issues", &issue_opened()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Event discarded");
}

#[tokio::test]
async fn test_foreign_origin_is_forbidden() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default().with_accept_origin("org/other"));

    // Act
    let response = app
        .oneshot(signed_request("issues", &issue_opened()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Event origin not allowed");
}

#[tokio::test]
async fn test_shared_receiver_serves_concurrent_requests() {
    // Arrange
    let app = create_test_app(ReceiverConfig::default().with_discard_sender("bot"));
    let senders = ["alice", "bot", "carol", "bot", "dave"];

    // Act
    let handles: Vec<_> = senders
        .iter()
        .map(|sender| {
            let app = app.clone();
            let body = json!({ "action": "created", "sender": { "login": sender } }).to_string();
            tokio::spawn(async move {
                app.oneshot(signed_request("issue_comment", &body))
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    // Assert
    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::FORBIDDEN,
            StatusCode::OK,
            StatusCode::FORBIDDEN,
            StatusCode::OK,
        ]
    );
}
