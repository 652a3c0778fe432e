//! Browser-like HTTP client.
//!
//! Upstream video hosts gate downloads on looking like a real browser, so
//! every request carries a desktop Chrome user agent and navigation headers.
//! The client keeps two connection pools:
//! - [`RedirectMode::Manual`] surfaces 3xx responses so resolvers can inspect `Location`
//! - [`RedirectMode::Follow`] follows redirects like a browser would

use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode, header,
    header::{HeaderMap, HeaderValue},
    redirect,
};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Default TCP connect timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Redirect hops followed in [`RedirectMode::Follow`].
const MAX_FOLLOWED_REDIRECTS: usize = 5;

/// Desktop Chrome user agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept header for page navigations.
pub const ACCEPT_DOCUMENT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Accept header for media fetches.
pub const ACCEPT_MEDIA: &str = "video/webm,video/ogg,video/*;q=0.9,application/octet-stream;q=0.8,*/*;q=0.7";

/// Accept header for JSON APIs.
pub const ACCEPT_JSON: &str = "application/json";

// ============================================================================
// Redirect Mode
// ============================================================================

/// Whether the client follows redirects itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Return 3xx responses to the caller.
    Manual,
    /// Follow up to five hops.
    Follow,
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with browser headers and tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    manual: Client,
    follow: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom connect timeout.
    ///
    /// No total timeout is installed on the client; each step supplies its
    /// own so that long media bodies are never cut off mid-stream.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, FetchError> {
        let manual = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;

        let follow = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect::Policy::limited(MAX_FOLLOWED_REDIRECTS))
            .build()?;

        Ok(Self { manual, follow })
    }

    /// Starts a request with browser navigation headers.
    pub fn request(&self, method: Method, url: &str, mode: RedirectMode) -> RequestBuilder {
        let client = match mode {
            RedirectMode::Manual => &self.manual,
            RedirectMode::Follow => &self.follow,
        };
        client.request(method, url).headers(browser_headers(ACCEPT_DOCUMENT))
    }

    /// Starts a GET request.
    pub fn get(&self, url: &str, mode: RedirectMode) -> RequestBuilder {
        self.request(Method::GET, url, mode)
    }

    /// Starts a POST request.
    pub fn post(&self, url: &str, mode: RedirectMode) -> RequestBuilder {
        self.request(Method::POST, url, mode)
    }

    /// Sends a request whose whole exchange, body included, must finish
    /// within `timeout`. Use for pages and JSON APIs.
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Http(e)
            }
        })?;
        debug!(status = %response.status(), url = %response.url(), "Response received");
        Ok(response)
    }

    /// Sends a request whose response headers must arrive within `timeout`.
    ///
    /// The body is left unbounded in time so arbitrarily long media can be
    /// streamed; dropping the response closes the connection.
    #[instrument(skip(self, request))]
    pub async fn send_streaming(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;
        debug!(status = %response.status(), url = %response.url(), "Streaming response headers received");
        Ok(response)
    }
}

/// Navigation headers a desktop browser sends, with the given `Accept`.
pub fn browser_headers(accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for inspecting upstream responses.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;

    /// Returns the lower-cased content type, or an empty string.
    fn content_type(&self) -> String;

    /// Returns true if the body is an HTML page.
    fn is_html(&self) -> bool {
        self.content_type().contains("text/html")
    }

    /// Returns the raw `Location` header.
    fn location(&self) -> Option<String>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS
    }

    fn retry_after_secs(&self) -> Option<u64> {
        retry_after_secs(self.headers())
    }

    fn content_type(&self) -> String {
        content_type(self.headers())
    }

    fn location(&self) -> Option<String> {
        self.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Parses `Retry-After` as whole seconds.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Returns the lower-cased content type, or an empty string.
pub fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
