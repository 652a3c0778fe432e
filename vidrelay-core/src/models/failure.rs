//! Structured resolution failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy surfaced at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Unparseable or unsupported source.
    InputError,
    /// No built-in resolver and no backend configured.
    ProviderUnsupported,
    /// Upstream fetch failed terminally.
    UpstreamUnavailable,
    /// Upstream kept rate limiting until retries ran out.
    UpstreamRateLimited,
    /// Every cascade approach was exhausted.
    AllAttemptsFailed,
}

impl FailureKind {
    /// Returns the default HTTP status for this kind.
    pub fn default_status(&self) -> u16 {
        match self {
            Self::InputError => 400,
            Self::ProviderUnsupported => 501,
            Self::UpstreamUnavailable | Self::UpstreamRateLimited | Self::AllAttemptsFailed => 502,
        }
    }

    /// Returns the stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputError => "input-error",
            Self::ProviderUnsupported => "provider-unsupported",
            Self::UpstreamUnavailable => "upstream-unavailable",
            Self::UpstreamRateLimited => "upstream-rate-limited",
            Self::AllAttemptsFailed => "all-attempts-failed",
        }
    }
}

/// A resolution failure carrying user-facing remediation text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ResolutionFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Short message.
    pub message: String,
    /// Optional remediation or diagnostic details.
    pub details: Option<String>,
    /// HTTP status to answer with.
    pub http_status: u16,
}

impl ResolutionFailure {
    /// Creates a failure of the given kind with its default status.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            http_status: kind.default_status(),
        }
    }

    /// Bad or unsupported input.
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InputError, message)
    }

    /// Provider needs a backend that is not configured.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ProviderUnsupported, message)
    }

    /// Upstream failed.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(FailureKind::UpstreamUnavailable, message)
    }

    /// All approaches exhausted.
    pub fn all_attempts_failed(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(FailureKind::AllAttemptsFailed, message).with_details(details)
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Overrides the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_statuses() {
        assert_eq!(ResolutionFailure::input("x").http_status, 400);
        assert_eq!(ResolutionFailure::unsupported("x").http_status, 501);
        assert_eq!(ResolutionFailure::upstream("x").http_status, 502);
    }

    #[test]
    fn test_all_attempts_failed_carries_details() {
        let failure = ResolutionFailure::all_attempts_failed("nope", "check sharing");
        assert_eq!(failure.kind, FailureKind::AllAttemptsFailed);
        assert_eq!(failure.details.as_deref(), Some("check sharing"));
        assert_eq!(failure.to_string(), "nope");
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&FailureKind::AllAttemptsFailed).unwrap();
        assert_eq!(json, "\"all-attempts-failed\"");
        assert_eq!(FailureKind::AllAttemptsFailed.as_str(), "all-attempts-failed");
    }
}
