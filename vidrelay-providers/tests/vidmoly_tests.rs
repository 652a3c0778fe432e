//! Integration tests for the Vidmoly resolver.

mod common;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use common::{Hits, collect_body, context, fast_settings, spawn};
use serde_json::json;
use vidrelay_core::FailureKind;
use vidrelay_fetch::StreamResolver;
use vidrelay_providers::VidmolyResolver;

fn host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn lookup(State(hits): State<Hits>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    hits.record("lookup");
    if id != "vid1" || headers.get(header::REFERER).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let base = format!("http://{}", host(&headers));
    Json(json!({
        "videos": [
            { "quality": "360p", "url": format!("{base}/v/low.mp4") },
            { "quality": "1080p", "url": format!("{base}/v/high.mp4") },
            { "quality": "720p", "url": format!("{base}/v/mid.mp4") },
        ]
    }))
    .into_response()
}

async fn media(State(hits): State<Hits>, Path(file): Path<String>, headers: HeaderMap) -> Response {
    hits.record(&file);
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if range != "bytes=0-" {
        return StatusCode::RANGE_NOT_SATISFIABLE.into_response();
    }
    (
        StatusCode::PARTIAL_CONTENT,
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_RANGE, "bytes 0-3/4".to_string()),
        ],
        file,
    )
        .into_response()
}

#[tokio::test]
async fn test_selects_highest_quality() {
    async fn page(State(hits): State<Hits>) -> Response {
        hits.record("page");
        (
            [(header::CONTENT_TYPE, "text/html")],
            r#"<script>var player = {"video_id":"vid1","autoplay":true};</script>"#,
        )
            .into_response()
    }

    let hits = Hits::default();
    let router = Router::new()
        .route("/{slug}", get(page))
        .route("/api/videos/{id}", get(lookup))
        .route("/v/{file}", get(media))
        .with_state(hits.clone());
    let base = spawn(router).await;
    let ctx = context(fast_settings(&base));

    let stream = VidmolyResolver::new()
        .resolve(&ctx, "w-abc123", None)
        .await
        .expect("resolution succeeds");

    assert_eq!(stream.status.as_u16(), 206);
    let body = collect_body(stream).await;
    assert_eq!(body, b"high.mp4");
    assert_eq!(hits.sequence(), vec!["page", "lookup", "high.mp4"]);
}

#[tokio::test]
async fn test_missing_video_id_is_upstream_error() {
    async fn page() -> Response {
        ([(header::CONTENT_TYPE, "text/html")], "<html>nothing here</html>").into_response()
    }

    let hits = Hits::default();
    let router = Router::new()
        .route("/{slug}", get(page))
        .route("/api/videos/{id}", get(lookup))
        .with_state(hits.clone());
    let base = spawn(router).await;
    let ctx = context(fast_settings(&base));

    let failure = VidmolyResolver::new()
        .resolve(&ctx, "w-abc123", Some("bytes=0-"))
        .await
        .expect_err("no video id");

    assert_eq!(failure.kind, FailureKind::UpstreamUnavailable);
    assert_eq!(failure.http_status, 502);
    assert!(failure.details.unwrap_or_default().contains("video ID"));
    assert_eq!(hits.count("lookup"), 0);
}

#[tokio::test]
async fn test_empty_slug_is_input_error() {
    let ctx = context(fast_settings("http://127.0.0.1:9"));
    let failure = VidmolyResolver::new()
        .resolve(&ctx, "  / ", None)
        .await
        .expect_err("empty slug");
    assert_eq!(failure.kind, FailureKind::InputError);
    assert_eq!(failure.http_status, 400);
}
