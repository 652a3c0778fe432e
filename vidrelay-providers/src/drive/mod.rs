//! Google Drive provider implementation.
//!
//! Drive gates downloads behind confirmation interstitials and quota
//! redirects. Resolution walks an ordered cascade of download URLs sharing
//! one cookie jar, then fetches the final URL with bounded retries.

mod approaches;
mod descriptor;
mod error;
mod interstitial;
mod metadata;
mod resolver;

pub use approaches::{ResolutionApproach, build_approaches, normalize_drive_id};
pub use descriptor::drive_descriptor;
pub use error::{DriveError, REMEDIATION};
pub use interstitial::{InterstitialForm, InterstitialParser, RegexInterstitialParser};
pub use metadata::{DriveFileMetadata, fetch_metadata};
pub use resolver::DriveResolver;
