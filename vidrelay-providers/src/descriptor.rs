//! Provider descriptor system.
//!
//! A descriptor holds the static facts about a provider:
//! - how the resolve phase treats it ([`ResolveMode`])
//! - which built-in [`StreamResolver`] serves its stream phase, if any

use std::fmt;
use std::sync::Arc;

use vidrelay_core::ProviderKind;
use vidrelay_fetch::StreamResolver;

// ============================================================================
// Resolve Mode
// ============================================================================

/// How a provider is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// The source URL is already playable.
    Passthrough,
    /// Streamed through a built-in resolver.
    BuiltIn,
    /// Delegated to the external proxy backend.
    Backend,
    /// Cannot be resolved.
    Unsupported,
}

impl ResolveMode {
    /// Short label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::BuiltIn => "built-in",
            Self::Backend => "backend",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete descriptor for a provider.
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderKind,
    /// Resolve-phase treatment.
    pub mode: ResolveMode,
    /// One-line description for listings.
    pub summary: &'static str,
    /// Builds the stream-phase resolver.
    pub build_resolver: Option<fn() -> Arc<dyn StreamResolver>>,
}

impl ProviderDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Returns the wire name.
    pub fn wire_name(&self) -> &'static str {
        self.id.as_str()
    }

    /// Builds the resolver, if the provider has one.
    pub fn resolver(&self) -> Option<Arc<dyn StreamResolver>> {
        self.build_resolver.map(|build| build())
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("has_resolver", &self.build_resolver.is_some())
            .finish()
    }
}
