//! Descriptors for providers served by the proxy backend.

use vidrelay_core::ProviderKind;

use crate::descriptor::{ProviderDescriptor, ResolveMode};

/// Creates the VOE provider descriptor.
pub fn voe_descriptor() -> ProviderDescriptor {
    backend_descriptor(ProviderKind::Voe, "Delegated to the proxy backend")
}

/// Creates the Streamtape provider descriptor.
pub fn streamtape_descriptor() -> ProviderDescriptor {
    backend_descriptor(ProviderKind::Streamtape, "Delegated to the proxy backend")
}

/// Creates the DoodStream provider descriptor.
pub fn dood_descriptor() -> ProviderDescriptor {
    backend_descriptor(ProviderKind::Dood, "Delegated to the proxy backend")
}

/// Creates the descriptor for unclassified sources.
pub fn unknown_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Unknown,
        mode: ResolveMode::Unsupported,
        summary: "Unrecognized source",
        build_resolver: None,
    }
}

fn backend_descriptor(id: ProviderKind, summary: &'static str) -> ProviderDescriptor {
    ProviderDescriptor {
        id,
        mode: ResolveMode::Backend,
        summary,
        build_resolver: None,
    }
}
