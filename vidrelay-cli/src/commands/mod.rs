//! CLI command implementations.

pub mod detect;
pub mod fetch;
pub mod providers;
pub mod resolve;
pub mod serve;
