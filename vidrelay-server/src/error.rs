//! Server error types.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use vidrelay_core::ResolutionFailure;
use vidrelay_fetch::FetchError;

use crate::config::ConfigError;

// ============================================================================
// API Error
// ============================================================================

/// Error answered to an HTTP caller as `{message, details?}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Short message.
    pub message: String,
    /// Remediation or upstream diagnostics.
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    /// Creates an error with the given status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 502.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<ResolutionFailure> for ApiError {
    fn from(failure: ResolutionFailure) -> Self {
        Self {
            status: StatusCode::from_u16(failure.http_status).unwrap_or(StatusCode::BAD_GATEWAY),
            message: failure.message,
            details: failure.details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            details: self.details.as_deref(),
        };
        let mut response = (self.status, Json(body)).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}

// ============================================================================
// Server Error
// ============================================================================

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] FetchError),

    /// Listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
