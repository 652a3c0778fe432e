//! Retry/backoff policy for upstream requests.
//!
//! 429 and 5xx responses are retried against the same URL. The wait is the
//! upstream's `Retry-After` seconds when present, otherwise a fixed default.
//! Every other status is handed back to the caller untouched.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::host::http::ResponseExt;

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default wait when the upstream gives no `Retry-After`.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on any single wait.
pub const MAX_DELAY: Duration = Duration::from_secs(60);

/// Bounded retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Wait used when the upstream sends no `Retry-After`.
    pub default_delay: Duration,
    /// Cap applied to `Retry-After`.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            default_delay: DEFAULT_DELAY,
            max_delay: MAX_DELAY,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            default_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the default wait.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Returns true for statuses retried against the same URL.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Wait before the next attempt.
    pub fn delay_for(&self, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs
            .map_or(self.default_delay, Duration::from_secs)
            .min(self.max_delay)
    }

    /// Determines if a transport error should be retried.
    pub fn should_retry_error(&self, error: &FetchError) -> bool {
        error.is_transient()
    }

    /// Sends the request built by `send` until it yields a non-retryable
    /// response or the attempt budget runs out.
    ///
    /// After the last attempt the final response (or error) is returned
    /// as-is, so callers still see the 429/5xx status.
    pub async fn send_with_retry<F, Fut>(&self, label: &str, mut send: F) -> Result<Response, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            let is_last = attempt >= self.max_attempts;
            match send().await {
                Ok(response) if !is_last && Self::is_retryable_status(response.status()) => {
                    let delay = self.delay_for(response.retry_after_secs());
                    warn!(
                        step = label,
                        status = %response.status(),
                        attempt,
                        delay_ms = delay.as_millis(),
                        "Retryable status, backing off"
                    );
                    drop(response);
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if !is_last && self.should_retry_error(&e) => {
                    debug!(step = label, attempt, error = %e, "Transient error, backing off");
                    tokio::time::sleep(self.default_delay).await;
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
