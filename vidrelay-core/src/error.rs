//! Core error types for vidrelay.

use thiserror::Error;

/// Core error type for vidrelay operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider name is not one of the known kinds.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
