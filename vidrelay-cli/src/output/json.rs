//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use vidrelay_providers::ProviderDescriptor;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a single provider.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOutput {
    pub provider: String,
    pub name: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
    pub summary: String,
}

impl ProviderOutput {
    fn from_descriptor(desc: &ProviderDescriptor) -> Self {
        Self {
            provider: desc.wire_name().to_string(),
            name: desc.display_name().to_string(),
            mode: desc.mode.label().to_string(),
            resolver: desc.resolver().map(|r| r.id().to_string()),
            summary: desc.summary.to_string(),
        }
    }
}

/// Status line and forwarded headers of a stream.
#[derive(Debug, Serialize)]
pub struct StreamHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl StreamHead {
    /// Creates a stream head.
    pub fn new(status: u16, headers: Vec<(String, String)>) -> Self {
        Self { status, headers }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the provider list.
    pub fn format_providers(&self, providers: &[ProviderDescriptor]) -> Result<String> {
        let outputs: Vec<ProviderOutput> = providers
            .iter()
            .map(ProviderOutput::from_descriptor)
            .collect();
        self.format(&outputs)
    }
}
