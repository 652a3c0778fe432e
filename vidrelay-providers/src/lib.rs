// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vidrelay Providers
//!
//! Provider-specific resolvers for the vidrelay proxy.
//!
//! Each provider module includes:
//!
//! - **Descriptor**: Static facts (resolve mode, resolver constructor)
//! - **Resolver**: A [`vidrelay_fetch::StreamResolver`] implementation, when built in
//!
//! ## Supported Providers
//!
//! | Provider | Resolve phase | Stream phase |
//! |----------|---------------|--------------|
//! | Google Drive | built-in | approach cascade + final fetch |
//! | Vidmoly | built-in | page scrape + lookup API |
//! | Direct | passthrough | fetch and forward |
//! | HLS | passthrough | fetch and forward |
//! | VOE | backend | backend URL, fetch and forward |
//! | Streamtape | backend | backend URL, fetch and forward |
//! | DoodStream | backend | backend URL, fetch and forward |
//!
//! ## Usage
//!
//! ```ignore
//! use vidrelay_core::ProviderKind;
//! use vidrelay_fetch::FetchContext;
//! use vidrelay_providers::ProviderRegistry;
//!
//! let ctx = FetchContext::new()?;
//! let resolver = ProviderRegistry::resolver(ProviderKind::GoogleDrive).unwrap();
//! let stream = resolver.resolve(&ctx, "1AbC...", Some("bytes=0-")).await?;
//! ```

pub mod descriptor;
pub mod registry;

// Provider modules (alphabetical)
pub mod backend;
pub mod direct;
pub mod drive;
pub mod vidmoly;

// Re-export key types
pub use descriptor::{ProviderDescriptor, ResolveMode};
pub use registry::ProviderRegistry;

// Re-export resolvers and clients
pub use backend::{BackendClient, BackendError};
pub use direct::DirectResolver;
pub use drive::{DriveError, DriveResolver, InterstitialParser, RegexInterstitialParser, normalize_drive_id};
pub use vidmoly::{VidmolyError, VidmolyResolver};
