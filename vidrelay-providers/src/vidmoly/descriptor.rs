//! Vidmoly provider descriptor.

use std::sync::Arc;

use vidrelay_core::ProviderKind;
use vidrelay_fetch::StreamResolver;

use super::resolver::VidmolyResolver;
use crate::descriptor::{ProviderDescriptor, ResolveMode};

/// Creates the Vidmoly provider descriptor.
pub fn vidmoly_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Vidmoly,
        mode: ResolveMode::BuiltIn,
        summary: "Watch page scrape, lookup API, best rendition",
        build_resolver: Some(build_vidmoly_resolver),
    }
}

fn build_vidmoly_resolver() -> Arc<dyn StreamResolver> {
    Arc::new(VidmolyResolver::new())
}
