//! Text output formatting with colors.

use vidrelay_core::SourceReference;
use vidrelay_providers::{ProviderDescriptor, ResolveMode};

use super::json::StreamHead;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a detection result.
    pub fn format_source(&self, reference: &SourceReference) -> String {
        let provider = if reference.is_known() {
            self.green(reference.provider.display_name())
        } else {
            self.red(reference.provider.display_name())
        };
        format!(
            "{} {} ({})\n{} {}",
            self.bold("Provider:  "),
            provider,
            reference.provider.as_str(),
            self.bold("Identifier:"),
            reference.identifier
        )
    }

    /// Formats the providers table header.
    pub fn format_providers_header(&self) -> String {
        format!(
            "{:<15} {:<13} {:<12} {}",
            self.bold("Provider"),
            self.bold("Wire name"),
            self.bold("Mode"),
            self.bold("Resolver")
        )
    }

    /// Formats a single provider line.
    pub fn format_provider_line(&self, desc: &ProviderDescriptor) -> String {
        let mode = match desc.mode {
            ResolveMode::BuiltIn | ResolveMode::Passthrough => self.green(desc.mode.label()),
            ResolveMode::Backend => self.yellow(desc.mode.label()),
            ResolveMode::Unsupported => self.dim(desc.mode.label()),
        };
        let resolver = desc
            .resolver()
            .map_or_else(|| self.dim("−"), |r| r.id().to_string());

        format!(
            "{:<15} {:<13} {:<12} {}",
            desc.display_name(),
            desc.wire_name(),
            mode,
            resolver
        )
    }

    /// Formats a stream status line and its headers.
    pub fn format_stream_head(&self, head: &StreamHead) -> String {
        let status = head.status.to_string();
        let status = if (200..300).contains(&head.status) {
            self.green(&status)
        } else {
            self.red(&status)
        };

        let mut lines = vec![format!("{} {}", self.bold("Status:"), status)];
        for (name, value) in &head.headers {
            lines.push(format!("  {}: {}", self.dim(name), value));
        }
        lines.join("\n")
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}
