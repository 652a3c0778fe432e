// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vidrelay Core
//!
//! Core types, source detection, and the failure model shared by every
//! other vidrelay crate.
//!
//! ## Key Types
//!
//! ### Provider Types
//! - [`ProviderKind`] - Enum of every provider family the proxy knows about
//! - [`SourceReference`] - A classified `(provider, identifier, original)` triple
//!
//! ### Failures
//! - [`FailureKind`] - Error taxonomy surfaced at the request boundary
//! - [`ResolutionFailure`] - Structured failure with remediation details
//!
//! ### Detection
//! - [`detect_source`] - Classifies free-form input into a [`SourceReference`]

pub mod detect;
pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export model types
pub use models::{FailureKind, ProviderKind, ResolutionFailure, SourceReference};

// Re-export detection entry points
pub use detect::{detect_source, drive_file_id_from_path};
