//! Host APIs for vidrelay resolvers.
//!
//! - [`http`] - Browser-like HTTP client
//! - [`cookies`] - Per-resolution cookie jar

pub mod cookies;
pub mod http;

pub use cookies::CookieJar;
pub use http::{HttpClient, RedirectMode, ResponseExt};
