//! In-process tests for the proxy endpoint.
//!
//! Requests go through the router with `oneshot`; upstream media and the
//! proxy backend are small axum apps on `127.0.0.1:0`.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower::ServiceExt;
use vidrelay_fetch::FetchContext;
use vidrelay_providers::BackendClient;
use vidrelay_server::{ProxyState, router};

const DRIVE_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz";

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn app(backend: Option<String>) -> Router {
    let ctx = FetchContext::new().unwrap();
    let state = ProxyState::new(ctx, "/api/proxy", backend.map(BackendClient::new));
    router(Arc::new(state))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_stream(app: Router, uri: &str, range: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(range) = range {
        request = request.header(header::RANGE, range);
    }
    app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Upstream serving `/video.mp4` as partial content, echoing the Range it saw.
async fn media_upstream() -> String {
    async fn video(headers: HeaderMap) -> Response {
        let range = headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string();
        (
            StatusCode::PARTIAL_CONTENT,
            [
                (header::CONTENT_TYPE, "video/mp4".to_string()),
                (header::CONTENT_RANGE, "bytes 0-4/10".to_string()),
                (header::SET_COOKIE, "tracking=1".to_string()),
                (header::HeaderName::from_static("x-upstream-node"), "edge-7".to_string()),
            ],
            range,
        )
            .into_response()
    }

    async fn page() -> Response {
        ([(header::CONTENT_TYPE, "text/html")], "<html>quota exceeded</html>").into_response()
    }

    async fn missing() -> Response {
        (StatusCode::NOT_FOUND, "gone").into_response()
    }

    spawn(
        Router::new()
            .route("/video.mp4", get(video))
            .route("/page.mp4", get(page))
            .route("/missing.mp4", get(missing)),
    )
    .await
}

// ============================================================================
// Preflight
// ============================================================================

#[tokio::test]
async fn test_options_returns_cors_headers() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/proxy")
        .body(Body::empty())
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, HEAD, OPTIONS"
    );
}

// ============================================================================
// Resolve Phase
// ============================================================================

#[tokio::test]
async fn test_resolve_requires_source() {
    let (status, body) = post_json(app(None), "/api/proxy", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("source"));
}

#[tokio::test]
async fn test_resolve_direct_returns_source() {
    let source = "https://cdn.example.com/movie.mp4";
    let (status, body) = post_json(app(None), "/api/proxy", json!({ "source": source })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playbackUrl"], source);
}

#[tokio::test]
async fn test_resolve_hls_returns_source() {
    let source = "https://cdn.example.com/live/index.m3u8";
    let (status, body) = post_json(app(None), "/api/proxy", json!({ "source": source })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playbackUrl"], source);
}

#[tokio::test]
async fn test_resolve_falls_back_to_query_parameters() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/proxy?source=https%3A%2F%2Fcdn.example.com%2Fa.webm")
        .body(Body::empty())
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["playbackUrl"], "https://cdn.example.com/a.webm");
}

#[tokio::test]
async fn test_resolve_vidmoly_builds_stream_url() {
    let (status, body) = post_json(
        app(None),
        "/api/proxy",
        json!({ "source": "https://vidmoly.me/w/abc123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["playbackUrl"],
        "/api/proxy?stream=1&provider=vidmoly&identifier=abc123"
    );
}

#[tokio::test]
async fn test_resolve_drive_builds_stream_url() {
    let source = format!("https://drive.google.com/file/d/{DRIVE_ID}/view?usp=sharing");
    let (status, body) = post_json(app(None), "/api/proxy", json!({ "source": source })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["playbackUrl"],
        format!("/api/proxy?stream=1&provider=google-drive&identifier={DRIVE_ID}")
    );
}

#[tokio::test]
async fn test_resolve_drive_with_short_id_is_bad_request() {
    let (status, _) = post_json(
        app(None),
        "/api/proxy",
        json!({ "source": "https://drive.google.com/file/d/short/view" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolve_unknown_source_is_bad_request() {
    let (status, body) = post_json(app(None), "/api/proxy", json!({ "source": "not a link" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_resolve_backend_provider_without_backend_is_501() {
    let (status, body) = post_json(
        app(None),
        "/api/proxy",
        json!({ "source": "https://voe.sx/e/xyz789" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(body["message"].as_str().unwrap().contains("voe"));
}

#[tokio::test]
async fn test_resolve_backend_provider_uses_backend() {
    async fn resolve(Json(body): Json<Value>) -> Response {
        if body["provider"] != "voe" || body["identifier"] != "xyz789" {
            return StatusCode::BAD_REQUEST.into_response();
        }
        Json(json!({ "playbackUrl": "https://cdn.example.com/voe.m3u8" })).into_response()
    }
    let backend = spawn(Router::new().route("/resolve", post(resolve))).await;

    let (status, body) = post_json(
        app(Some(format!("{backend}/resolve"))),
        "/api/proxy",
        json!({ "source": "https://voe.sx/e/xyz789" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playbackUrl"], "https://cdn.example.com/voe.m3u8");
}

#[tokio::test]
async fn test_resolve_backend_error_status_is_passed_through() {
    async fn resolve() -> Response {
        (StatusCode::NOT_FOUND, "no such video").into_response()
    }
    let backend = spawn(Router::new().route("/resolve", post(resolve))).await;

    let (status, body) = post_json(
        app(Some(format!("{backend}/resolve"))),
        "/api/proxy",
        json!({ "source": "https://streamtape.com/v/abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "no such video");
}

// ============================================================================
// Stream Phase
// ============================================================================

#[tokio::test]
async fn test_stream_without_flag_is_bad_request() {
    let response = get_stream(app(None), "/api/proxy?provider=direct&identifier=x", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_without_identifier_is_bad_request() {
    let response = get_stream(app(None), "/api/proxy?stream=1&provider=direct", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn test_stream_drive_with_bad_id_is_bad_request() {
    let response = get_stream(
        app(None),
        "/api/proxy?stream=1&provider=google-drive&identifier=tooshort",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_direct_forwards_allow_listed_headers() {
    let upstream = media_upstream().await;
    let uri = format!(
        "/api/proxy?stream=1&provider=direct&identifier={}",
        urlencoding::encode(&format!("{upstream}/video.mp4"))
    );

    let response = get_stream(app(None), &uri, Some("bytes=0-4")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 0-4/10");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert!(!headers.contains_key(header::SET_COOKIE));
    assert!(!headers.contains_key("x-upstream-node"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"bytes=0-4");
}

#[tokio::test]
async fn test_stream_defaults_range() {
    let upstream = media_upstream().await;
    let uri = format!(
        "/api/proxy?stream=1&provider=direct&identifier=ignored&source={}",
        urlencoding::encode(&format!("{upstream}/video.mp4"))
    );

    let response = get_stream(app(None), &uri, None).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"bytes=0-");
}

#[tokio::test]
async fn test_stream_never_forwards_html() {
    let upstream = media_upstream().await;
    let uri = format!(
        "/api/proxy?stream=1&provider=direct&identifier={}",
        urlencoding::encode(&format!("{upstream}/page.mp4"))
    );

    let response = get_stream(app(None), &uri, None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
}

#[tokio::test]
async fn test_stream_direct_error_carries_upstream_status() {
    let upstream = media_upstream().await;
    let uri = format!(
        "/api/proxy?stream=1&provider=direct&identifier={}",
        urlencoding::encode(&format!("{upstream}/missing.mp4"))
    );

    let response = get_stream(app(None), &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["details"], "gone");
}

#[tokio::test]
async fn test_stream_backend_provider_fetches_playback_url() {
    let upstream = media_upstream().await;
    let playback = format!("{upstream}/video.mp4");
    let backend = spawn(Router::new().route(
        "/resolve",
        post(move |Json(body): Json<Value>| {
            let playback = playback.clone();
            async move {
                assert_eq!(body["source"], "https://dood.to/e/abc");
                Json(json!({ "playbackUrl": playback }))
            }
        }),
    ))
    .await;

    let uri = format!(
        "/api/proxy?stream=1&provider=dood&identifier=abc&source={}",
        urlencoding::encode("https://dood.to/e/abc")
    );
    let response = get_stream(app(Some(format!("{backend}/resolve"))), &uri, None).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
}

#[tokio::test]
async fn test_stream_backend_provider_without_backend_is_501() {
    let response = get_stream(
        app(None),
        "/api/proxy?stream=1&provider=streamtape&identifier=abc",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}
