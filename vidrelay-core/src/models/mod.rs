//! Domain models.

mod failure;
mod provider;

pub use failure::{FailureKind, ResolutionFailure};
pub use provider::{ProviderKind, SourceReference};
