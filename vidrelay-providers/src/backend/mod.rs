//! External proxy backend.
//!
//! Configured through `PROXY_SERVICE_URL`. Without it, providers that rely
//! on the backend are reported as unsupported.

mod client;
mod descriptor;
mod error;

pub use client::{BackendClient, BackendRequest};
pub use descriptor::{dood_descriptor, streamtape_descriptor, unknown_descriptor, voe_descriptor};
pub use error::BackendError;
