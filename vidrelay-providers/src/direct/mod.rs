//! Direct file and HLS passthrough.
//!
//! The source URL is playable as-is; streaming only forwards it.

mod descriptor;
mod resolver;

pub use descriptor::{direct_descriptor, hls_descriptor};
pub use resolver::DirectResolver;
