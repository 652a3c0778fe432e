//! Direct and HLS provider descriptors.

use std::sync::Arc;

use vidrelay_core::ProviderKind;
use vidrelay_fetch::StreamResolver;

use super::resolver::DirectResolver;
use crate::descriptor::{ProviderDescriptor, ResolveMode};

/// Creates the direct-file provider descriptor.
pub fn direct_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Direct,
        mode: ResolveMode::Passthrough,
        summary: "Plain media file URL",
        build_resolver: Some(|| Arc::new(DirectResolver::direct()) as Arc<dyn StreamResolver>),
    }
}

/// Creates the HLS playlist provider descriptor.
pub fn hls_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Hls,
        mode: ResolveMode::Passthrough,
        summary: "HLS playlist URL",
        build_resolver: Some(|| Arc::new(DirectResolver::hls()) as Arc<dyn StreamResolver>),
    }
}
