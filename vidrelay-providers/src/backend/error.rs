//! Proxy backend errors.

use thiserror::Error;
use vidrelay_core::ResolutionFailure;

/// Proxy backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be reached.
    #[error("Error reaching the proxy service: {0}")]
    Unreachable(String),

    /// Backend answered with a non-2xx status.
    #[error("Proxy service returned an error")]
    Status {
        /// Backend status code.
        status: u16,
        /// Backend response body.
        body: String,
    },

    /// Backend answered without a `playbackUrl` string.
    #[error("Proxy service did not return the expected data")]
    InvalidPayload,
}

impl From<BackendError> for ResolutionFailure {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, ref body } => {
                let failure = ResolutionFailure::upstream(err.to_string()).with_status(status);
                if body.is_empty() {
                    failure
                } else {
                    failure.with_details(body.clone())
                }
            }
            _ => ResolutionFailure::upstream(err.to_string()),
        }
    }
}
