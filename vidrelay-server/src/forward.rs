//! Stream forwarder.
//!
//! Turns a [`ResolvedStream`] into the response sent to the player. Only an
//! allow-list of upstream headers survives; CORS and no-cache headers are
//! always set. The body is piped chunk by chunk and never buffered.

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use vidrelay_fetch::ResolvedStream;

use crate::error::ApiError;

/// Upstream headers copied onto the forwarded response.
pub static FORWARDED_HEADERS: [HeaderName; 8] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::ACCEPT_RANGES,
    header::CONTENT_RANGE,
    header::CONTENT_DISPOSITION,
    header::CACHE_CONTROL,
    header::ETAG,
    header::LAST_MODIFIED,
];

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Range";
const NO_CACHE: &str = "no-cache, no-store, must-revalidate, max-age=0";

/// Builds the forwarded header set from upstream headers.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in &FORWARDED_HEADERS {
        if let Some(value) = upstream.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
        );
    }

    insert_cors(&mut headers);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

/// Pipes `stream` to the caller.
///
/// An HTML body is refused with 502 so a confirmation page never reaches the
/// player as media.
pub fn forward(stream: ResolvedStream) -> Result<Response, ApiError> {
    if stream.is_html() {
        warn!(status = %stream.status, "Upstream answered with HTML, refusing to forward");
        return Err(ApiError::bad_gateway("Source cannot be streamed as video"));
    }

    let headers = response_headers(&stream.headers);
    debug!(
        status = %stream.status,
        content_type = ?headers.get(header::CONTENT_TYPE),
        "Forwarding upstream body"
    );

    let mut response = Response::new(Body::from_stream(stream.body));
    *response.status_mut() = stream.status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Answer to a CORS preflight.
pub fn preflight() -> Response {
    let mut headers = HeaderMap::new();
    insert_cors(&mut headers);
    (StatusCode::NO_CONTENT, headers).into_response()
}

fn insert_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    let exposed = FORWARDED_HEADERS
        .iter()
        .map(HeaderName::as_str)
        .collect::<Vec<_>>()
        .join(",");
    if let Ok(value) = HeaderValue::from_str(&exposed) {
        headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, value);
    }
}
