//! Common test utilities for the webhook route tests
//!
//! This module provides:
//! - An axum router that serves a shared [`Receiver`]
//! - Builders for signed webhook requests

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use issue_hook_core::signature::{sign, SignatureAlgorithm};
use issue_hook_core::{RawRequest, Receiver, ReceiverConfig};
use std::sync::Arc;

pub const SECRET: &str = "123ABC";

// ============================================================================
// Router
// ============================================================================

/// Router exposing `POST /webhook` backed by a receiver built from `config`.
pub fn create_test_app(config: ReceiverConfig) -> Router {
    let receiver = Arc::new(Receiver::new(config.with_secret_token(SECRET)));

    Router::new()
        .route("/webhook", post(receive_webhook))
        .with_state(receiver)
}

async fn receive_webhook(
    State(receiver): State<Arc<Receiver>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut request = RawRequest::from_header_map(&headers, body);

    match receiver.parse_request(&mut request) {
        Ok(payload) => (StatusCode::OK, Json(payload.context().clone())).into_response(),
        Err(error) => {
            let status = StatusCode::from_u16(error.status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, error.message().to_string()).into_response()
        }
    }
}

// ============================================================================
// Request Builders
// ============================================================================

/// POST request for `body` signed with [`SECRET`] and tagged with `event`.
#[allow(dead_code)]
pub fn signed_request(event: &str, body: &str) -> Request<Body> {
    let signature = sign(SECRET.as_bytes(), body.as_bytes(), SignatureAlgorithm::Sha1)
        .expect("signing should not fail");

    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-hub-signature", signature)
        .header("x-github-event", event)
        .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Read a response body to a string.
#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
