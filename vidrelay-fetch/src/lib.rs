// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vidrelay Fetch
//!
//! HTTP plumbing shared by every provider resolver.
//!
//! ## Host APIs
//!
//! - [`host::http`] - Browser-like HTTP client with manual and following redirect modes
//! - [`host::cookies`] - Per-resolution cookie jar
//!
//! ## Resolution Infrastructure
//!
//! - [`retry::RetryPolicy`] - Bounded retry/backoff controller honoring `Retry-After`
//! - [`context::FetchContext`] - HTTP client plus centralized [`context::ResolverSettings`]
//! - [`resolver::StreamResolver`] - Contract implemented by each provider resolver
//! - [`stream::ResolvedStream`] - Upstream status, headers, and a lazy body stream
//! - [`attempt::AttemptLog`] - Record of attempts made during one resolution
//!
//! ## Example
//!
//! ```ignore
//! use vidrelay_fetch::{FetchContext, ResolverSettings};
//!
//! let ctx = FetchContext::with_settings(ResolverSettings::default())?;
//! let stream = resolver.resolve(&ctx, "file-id", Some("bytes=0-")).await?;
//! ```

pub mod attempt;
pub mod context;
pub mod error;
pub mod host;
pub mod resolver;
pub mod retry;
pub mod stream;

// Errors
pub use error::FetchError;

// Host APIs
pub use host::{
    cookies::CookieJar,
    http::{HttpClient, RedirectMode, ResponseExt},
};

// Resolution infrastructure
pub use attempt::{Attempt, AttemptLog, AttemptOutcome};
pub use context::{Endpoints, FetchContext, FetchContextBuilder, ResolverSettings};
pub use resolver::StreamResolver;
pub use retry::RetryPolicy;
pub use stream::{ByteStream, ResolvedStream};
