//! Resolved upstream media streams.

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};

use crate::error::FetchError;
use crate::host::http::content_type;

/// Forward-only body stream.
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Content type forced onto ambiguous binary responses.
pub const FALLBACK_VIDEO_TYPE: &str = "video/mp4";

/// An upstream response ready to be forwarded.
///
/// The body is consumed at most once. Dropping the stream releases the
/// upstream connection.
pub struct ResolvedStream {
    /// Upstream status, normally 200 or 206.
    pub status: StatusCode,
    /// Upstream headers, possibly normalized by the resolver.
    pub headers: HeaderMap,
    /// Lazy body.
    pub body: ByteStream,
}

impl ResolvedStream {
    /// Takes ownership of a response without reading its body.
    pub fn from_response(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FetchError::from))
            .boxed();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Lower-cased content type, or an empty string.
    pub fn content_type(&self) -> String {
        content_type(&self.headers)
    }

    /// Returns true if the upstream answered with an HTML page.
    pub fn is_html(&self) -> bool {
        self.content_type().contains("text/html")
    }

    /// Forces [`FALLBACK_VIDEO_TYPE`] unless the type is already `video/*`
    /// or an HLS playlist type.
    pub fn force_video_type(mut self) -> Self {
        let ct = self.content_type();
        if !ct.starts_with("video/") && !ct.contains("mpegurl") {
            self.headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(FALLBACK_VIDEO_TYPE));
        }
        self
    }

    /// Adds permissive CORS and guarantees `Accept-Ranges`.
    pub fn with_cors(mut self) -> Self {
        self.headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        self.headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("*"),
        );
        if !self.headers.contains_key(header::ACCEPT_RANGES) {
            self.headers
                .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        }
        self
    }
}

impl std::fmt::Debug for ResolvedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Returns true for content types that are plainly media.
pub fn is_media_type(content_type: &str) -> bool {
    content_type.starts_with("video/")
        || content_type.starts_with("audio/")
        || content_type.contains("mpegurl")
        || content_type.contains("stream")
}

/// Returns true when `Content-Disposition` names a file.
pub fn has_attachment_filename(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("filename="))
}
