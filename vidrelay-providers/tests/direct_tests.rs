//! Integration tests for the passthrough resolver.

mod common;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use common::{Hits, collect_body, context, fast_settings, spawn};
use vidrelay_core::FailureKind;
use vidrelay_fetch::StreamResolver;
use vidrelay_providers::DirectResolver;

#[tokio::test]
async fn test_range_is_forwarded_and_redirects_followed() {
    async fn moved() -> Response {
        (StatusCode::FOUND, [(header::LOCATION, "/files/clip.mp4")]).into_response()
    }

    async fn clip(State(hits): State<Hits>, headers: HeaderMap) -> Response {
        hits.record("clip");
        let range = headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (StatusCode::PARTIAL_CONTENT, [(header::CONTENT_TYPE, "video/mp4")], range).into_response()
    }

    let hits = Hits::default();
    let router = Router::new()
        .route("/moved.mp4", get(moved))
        .route("/files/clip.mp4", get(clip))
        .with_state(hits.clone());
    let base = spawn(router).await;
    let ctx = context(fast_settings(&base));

    let stream = DirectResolver::direct()
        .resolve(&ctx, &format!("{base}/moved.mp4"), Some("bytes=10-"))
        .await
        .expect("resolution succeeds");

    assert_eq!(stream.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(collect_body(stream).await, b"bytes=10-");
    assert_eq!(hits.count("clip"), 1);
}

#[tokio::test]
async fn test_error_body_is_capped_in_details() {
    async fn missing() -> Response {
        (StatusCode::NOT_FOUND, "x".repeat(64 * 1024)).into_response()
    }

    let base = spawn(Router::new().route("/gone.mp4", get(missing))).await;
    let ctx = context(fast_settings(&base));

    let failure = DirectResolver::direct()
        .resolve(&ctx, &format!("{base}/gone.mp4"), None)
        .await
        .expect_err("upstream 404");

    assert_eq!(failure.kind, FailureKind::UpstreamUnavailable);
    assert_eq!(failure.http_status, 404);
    let details = failure.details.expect("body excerpt");
    assert_eq!(details.len(), 2048);
    assert!(details.chars().all(|c| c == 'x'));
}
