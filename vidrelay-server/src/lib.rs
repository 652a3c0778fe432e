// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vidrelay Server
//!
//! HTTP surface of the vidrelay proxy.
//!
//! One mount path (default `/api/proxy`) serves three methods:
//!
//! | Method | Phase | Answer |
//! |--------|-------|--------|
//! | `POST` | resolve | `{playbackUrl}` or `{message, details?}` |
//! | `GET` (`stream=1`) | stream | forwarded media bytes or `{message, details?}` |
//! | `OPTIONS` | preflight | `204` with CORS headers |
//!
//! ## Modules
//!
//! - [`config`] - `ServerConfig` file and environment loading
//! - [`error`] - `ApiError` (the JSON error body) and `ServerError`
//! - [`forward`] - Header normalization and body piping for media responses
//! - [`proxy`] - Resolve and stream phase logic plus their handlers
//! - [`routes`] - Router assembly and `run_server`

pub mod config;
pub mod error;
pub mod forward;
pub mod proxy;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ServerError};
pub use proxy::{PlaybackResponse, ProxyQuery, ProxyState, ResolveRequest, open_stream, resolve_playback};
pub use routes::{AppState, router, run_server};
