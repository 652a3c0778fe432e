//! Fetch error types.

use std::time::Duration;
use thiserror::Error;
use vidrelay_core::{FailureKind, ResolutionFailure};

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for upstream fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No response headers within the step timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the upstream after all retries.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds the upstream asked us to wait.
        retry_after: Option<u64>,
    },

    /// Upstream answered with a status we cannot use.
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Invalid response from the upstream.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Returns true for errors worth retrying against the same URL.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::UnexpectedStatus(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}

impl From<FetchError> for ResolutionFailure {
    fn from(err: FetchError) -> Self {
        let kind = match err {
            FetchError::RateLimited { .. } => FailureKind::UpstreamRateLimited,
            _ => FailureKind::UpstreamUnavailable,
        };
        ResolutionFailure::new(kind, err.to_string())
    }
}
