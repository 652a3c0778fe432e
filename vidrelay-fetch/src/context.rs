//! Fetch context shared by resolvers.
//!
//! The context bundles the HTTP client with every tunable the resolvers use:
//! retry budget, backoff, timeouts, recursion bound, API key and upstream
//! endpoint bases. Nothing in it is mutated after construction, so a single
//! context can serve concurrent requests.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::host::http::HttpClient;
use crate::retry::{DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

/// Shortest API key worth sending upstream.
pub const MIN_API_KEY_LEN: usize = 20;

// ============================================================================
// Endpoints
// ============================================================================

/// Upstream endpoint bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    /// Origin serving `uc?export=download` and viewer pages.
    pub drive_origin: String,
    /// Base of the authenticated files API.
    pub drive_api_base: String,
    /// Origin serving generic-host watch pages.
    pub vidmoly_origin: String,
    /// Base of the generic-host video lookup API.
    pub vidmoly_lookup_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            drive_origin: "https://drive.google.com".to_string(),
            drive_api_base: "https://www.googleapis.com".to_string(),
            vidmoly_origin: "https://vidmoly.me".to_string(),
            vidmoly_lookup_api: "https://api.vevioz.com/api/button/videos".to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at one base URL. Used by tests against a local upstream.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            drive_origin: base.to_string(),
            drive_api_base: base.to_string(),
            vidmoly_origin: base.to_string(),
            vidmoly_lookup_api: format!("{base}/api/videos"),
        }
    }
}

// ============================================================================
// Resolver Settings
// ============================================================================

/// Settings for resolution operations.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Attempts per approach and per final-URL fetch.
    pub max_retries: u32,
    /// Wait used when no `Retry-After` is given.
    pub default_backoff: Duration,
    /// Pause before submitting a confirmation form.
    pub form_submit_delay: Duration,
    /// Timeout for watch pages.
    pub page_timeout: Duration,
    /// Timeout for JSON API calls.
    pub api_timeout: Duration,
    /// Time-to-headers bound for media fetches.
    pub stream_timeout: Duration,
    /// Bound on viewer-redirect recursion.
    pub max_redirect_depth: u8,
    /// Key for the authenticated files API.
    pub drive_api_key: Option<String>,
    /// Upstream endpoint bases.
    pub endpoints: Endpoints,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_ATTEMPTS,
            default_backoff: DEFAULT_DELAY,
            form_submit_delay: Duration::from_secs(1),
            page_timeout: Duration::from_secs(10),
            api_timeout: Duration::from_secs(15),
            stream_timeout: Duration::from_secs(30),
            max_redirect_depth: 3,
            drive_api_key: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ResolverSettings {
    /// Sets the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the default backoff.
    pub fn with_default_backoff(mut self, backoff: Duration) -> Self {
        self.default_backoff = backoff;
        self
    }

    /// Sets the form submit pause.
    pub fn with_form_submit_delay(mut self, delay: Duration) -> Self {
        self.form_submit_delay = delay;
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.drive_api_key = Some(key.into());
        self
    }

    /// Sets the endpoint bases.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Builds the retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_default_delay(self.default_backoff)
    }

    /// The API key, if one long enough to be real is configured.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.drive_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| k.len() >= MIN_API_KEY_LEN)
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context handed to every resolver.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client.
    pub http: Arc<HttpClient>,
    /// Resolver settings.
    pub settings: ResolverSettings,
}

impl FetchContext {
    /// Creates a context with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(ResolverSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: ResolverSettings) -> Result<Self, FetchError> {
        Ok(Self {
            http: Arc::new(HttpClient::new()?),
            settings,
        })
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the retry policy for this context.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry_policy()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Debug, Default)]
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: ResolverSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the resolver settings.
    pub fn settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the context.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(HttpClient::new()?),
        };
        Ok(FetchContext {
            http,
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.max_retries, 6);
        assert_eq!(settings.default_backoff, Duration::from_secs(5));
        assert_eq!(settings.max_redirect_depth, 3);
        assert_eq!(settings.stream_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_short_api_key_is_ignored() {
        let settings = ResolverSettings::default().with_api_key("short");
        assert_eq!(settings.usable_api_key(), None);

        let settings = ResolverSettings::default().with_api_key("AIzaSyA-0123456789abcdefgh");
        assert_eq!(settings.usable_api_key(), Some("AIzaSyA-0123456789abcdefgh"));
    }

    #[test]
    fn test_endpoints_all_at() {
        let endpoints = Endpoints::all_at("http://127.0.0.1:9000/");
        assert_eq!(endpoints.drive_origin, "http://127.0.0.1:9000");
        assert_eq!(endpoints.vidmoly_lookup_api, "http://127.0.0.1:9000/api/videos");
    }

    #[test]
    fn test_endpoints_partial_json_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"driveOrigin":"http://localhost:1"}"#).unwrap();
        assert_eq!(endpoints.drive_origin, "http://localhost:1");
        assert_eq!(endpoints.drive_api_base, "https://www.googleapis.com");
    }

    #[test]
    fn test_builder_uses_settings() {
        let ctx = FetchContext::builder()
            .settings(ResolverSettings::default().with_max_retries(2))
            .build()
            .unwrap();
        assert_eq!(ctx.retry_policy().max_attempts, 2);
    }
}
