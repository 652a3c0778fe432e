//! Vidmoly-specific errors.

use thiserror::Error;
use vidrelay_core::ResolutionFailure;
use vidrelay_fetch::FetchError;

/// Vidmoly errors. Each variant names the step that failed.
#[derive(Debug, Error)]
pub enum VidmolyError {
    /// Slug is empty.
    #[error("Invalid Vidmoly slug")]
    InvalidSlug,

    /// Watch page request failed.
    #[error("Failed to fetch Vidmoly page: {0}")]
    PageFetch(FetchError),

    /// Watch page has no recognizable video id.
    #[error("Could not extract video ID from the page")]
    VideoIdNotFound,

    /// Lookup API request failed.
    #[error("Failed to fetch video info: {0}")]
    Lookup(FetchError),

    /// Lookup API returned no usable source.
    #[error("No video sources found in the API response")]
    NoSources,

    /// Media request failed.
    #[error("Failed to fetch video: {0}")]
    Stream(FetchError),
}

impl From<VidmolyError> for ResolutionFailure {
    fn from(err: VidmolyError) -> Self {
        match err {
            VidmolyError::InvalidSlug => ResolutionFailure::input(err.to_string()),
            _ => ResolutionFailure::upstream("Failed to load Vidmoly video")
                .with_details(format!("Vidmoly error: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_step() {
        let err = VidmolyError::Lookup(FetchError::UnexpectedStatus(404));
        assert_eq!(err.to_string(), "Failed to fetch video info: Unexpected status code: 404");

        let failure: ResolutionFailure = err.into();
        assert_eq!(failure.http_status, 502);
        assert!(failure.details.unwrap().contains("video info"));
    }
}
