//! Google Drive errors.

use thiserror::Error;
use vidrelay_core::ResolutionFailure;

/// Steps users can take when a Drive file cannot be streamed.
pub const REMEDIATION: &str = "Could not access the Google Drive file. Please check:\n\
    1. The file is shared with \"Anyone with the link\"\n\
    2. The file is under 100MB, or an API key is configured for larger files\n\
    3. The Google Drive link is correct\n\
    4. Large files may need a few minutes of processing by Google Drive\n\
    5. Consider hosting the video on another platform";

/// Google Drive errors.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Identifier does not look like a Drive file id.
    #[error("Invalid Google Drive file id: {0}")]
    InvalidId(String),

    /// No approach produced a final URL.
    #[error("All download approaches failed")]
    AllApproachesFailed {
        /// Per-approach outcomes.
        attempts: String,
    },

    /// The final URL never yielded media.
    #[error("Google Drive stream failed after {retries} attempts: {last}")]
    FinalFetchFailed {
        /// Attempts made.
        retries: u32,
        /// Last observed status or error.
        last: String,
    },
}

impl From<DriveError> for ResolutionFailure {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::InvalidId(_) => ResolutionFailure::input(err.to_string()),
            DriveError::AllApproachesFailed { ref attempts } => {
                let details = format!("{REMEDIATION}\n\nAttempts:\n{attempts}");
                ResolutionFailure::all_attempts_failed(err.to_string(), details)
            }
            DriveError::FinalFetchFailed { .. } => {
                ResolutionFailure::all_attempts_failed(err.to_string(), REMEDIATION)
            }
        }
    }
}
