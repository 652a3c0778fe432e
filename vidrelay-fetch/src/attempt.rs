//! Attempt records for one resolution.
//!
//! Resolvers push an [`Attempt`] for every upstream call they make so that a
//! failed resolution can report what was tried and what the upstream said.

use std::fmt;
use std::time::{Duration, Instant};

// ============================================================================
// Attempt Outcome
// ============================================================================

/// What a single upstream call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 3xx carrying a usable `Location`.
    Redirected(String),
    /// 2xx with a media body.
    Media,
    /// 2xx HTML confirmation page.
    Interstitial,
    /// Any other status.
    Status(u16),
    /// Transport error or timeout.
    Error(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirected(location) => write!(f, "redirected to {location}"),
            Self::Media => write!(f, "media"),
            Self::Interstitial => write!(f, "interstitial page"),
            Self::Status(status) => write!(f, "status {status}"),
            Self::Error(e) => write!(f, "error: {e}"),
        }
    }
}

// ============================================================================
// Attempt
// ============================================================================

/// Record of one upstream call.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Step or approach name.
    pub step: String,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// How long the call took.
    pub duration: Duration,
}

impl Attempt {
    /// Returns true if the attempt did not move the resolution forward.
    /// An interstitial that could not be passed counts as a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self.outcome, AttemptOutcome::Media | AttemptOutcome::Redirected(_))
    }
}

// ============================================================================
// Attempt Log
// ============================================================================

/// Ordered attempts made during one resolution.
#[derive(Debug)]
pub struct AttemptLog {
    attempts: Vec<Attempt>,
    started: Instant,
}

impl AttemptLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Records an attempt.
    pub fn push(&mut self, step: impl Into<String>, outcome: AttemptOutcome, duration: Duration) {
        self.attempts.push(Attempt {
            step: step.into(),
            outcome,
            duration,
        });
    }

    /// All recorded attempts.
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Number of recorded attempts.
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Returns true if nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// The most recent failed attempt.
    pub fn last_failure(&self) -> Option<&Attempt> {
        self.attempts.iter().rev().find(|a| a.is_failure())
    }

    /// Time since the log was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// One line per attempt, e.g. `standard-download: status 403`.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| format!("{}: {}", a.step, a.outcome))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for AttemptLog {
    fn default() -> Self {
        Self::new()
    }
}
