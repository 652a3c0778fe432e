//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, StreamHead};
pub use text::TextFormatter;
#[cfg(test)]
mod tests;
