// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP application served by `snaphook serve`.
//!
//! `GET /api` returns a fixed greeting and `GET /metrics` exposes the
//! Prometheus registry. Neither route touches the hook registry.

use axum::{http::header, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

/// Build the application router.
pub fn router() -> Router {
    Router::new()
        .route("/api", get(hello_api))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
}

async fn hello_api() -> Json<Message> {
    Json(Message {
        message: "Hello, World!",
    })
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn fetch(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_hello_api() {
        let (status, body) = fetch("/api").await;
        assert_eq!(status, StatusCode::OK);

        let data: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(data, json!({"message": "Hello, World!"}));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = fetch("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_route() {
        crate::metrics::record_transition(snaphook_core::LifecycleState::Running);

        let (status, body) = fetch("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body)
            .unwrap()
            .contains("snaphook_lifecycle_transitions_total"));
    }
}
