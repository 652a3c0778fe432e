//! Vidmoly provider implementation.
//!
//! The watch page embeds an internal video id; a lookup API maps that id to
//! renditions, and the highest quality one is streamed.

mod api;
mod descriptor;
mod error;
mod page;
mod quality;
mod resolver;

pub use api::{LookupResponse, VideoSource, lookup_sources};
pub use descriptor::vidmoly_descriptor;
pub use error::VidmolyError;
pub use page::extract_video_id;
pub use quality::{quality_rank, select_best};
pub use resolver::VidmolyResolver;
