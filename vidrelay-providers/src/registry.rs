//! Provider registry for managing all provider descriptors.
//!
//! The registry provides static access to every provider's descriptor and
//! to the shared resolver instances used by the stream phase.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use vidrelay_core::ProviderKind;
use vidrelay_fetch::StreamResolver;

use crate::backend::{dood_descriptor, streamtape_descriptor, unknown_descriptor, voe_descriptor};
use crate::descriptor::{ProviderDescriptor, ResolveMode};
use crate::direct::{direct_descriptor, hls_descriptor};
use crate::drive::drive_descriptor;
use crate::vidmoly::vidmoly_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all provider descriptors.
static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();

/// Static storage for the built resolvers.
static RESOLVERS: OnceLock<HashMap<ProviderKind, Arc<dyn StreamResolver>>> = OnceLock::new();

/// Initializes all provider descriptors, in detection priority order.
fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        drive_descriptor(),
        vidmoly_descriptor(),
        voe_descriptor(),
        direct_descriptor(),
        hls_descriptor(),
        streamtape_descriptor(),
        dood_descriptor(),
        unknown_descriptor(),
    ]
}

fn build_resolvers(descriptors: &[ProviderDescriptor]) -> HashMap<ProviderKind, Arc<dyn StreamResolver>> {
    descriptors
        .iter()
        .filter_map(|d| d.resolver().map(|r| (d.id, r)))
        .collect()
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Global registry of all provider descriptors.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all provider descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a provider descriptor by kind.
    pub fn get(id: ProviderKind) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Resolve-phase treatment for `id`.
    pub fn mode(id: ProviderKind) -> ResolveMode {
        Self::get(id).map_or(ResolveMode::Unsupported, |d| d.mode)
    }

    /// Returns the shared stream resolver for `id`, if one is built in.
    pub fn resolver(id: ProviderKind) -> Option<Arc<dyn StreamResolver>> {
        RESOLVERS
            .get_or_init(|| build_resolvers(Self::all()))
            .get(&id)
            .cloned()
    }

    /// Returns providers resolved with the given mode.
    pub fn with_mode(mode: ResolveMode) -> Vec<&'static ProviderDescriptor> {
        Self::all().iter().filter(|d| d.mode == mode).collect()
    }

    /// Returns the number of registered providers.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all provider kinds.
    pub fn kinds() -> Vec<ProviderKind> {
        Self::all().iter().map(|d| d.id).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_kind() {
        assert_eq!(ProviderRegistry::count(), ProviderKind::all().len());
        for kind in ProviderKind::all() {
            let desc = ProviderRegistry::get(*kind);
            assert!(desc.is_some(), "Should find provider {kind:?}");
            assert_eq!(desc.unwrap().id, *kind);
        }
    }

    #[test]
    fn test_modes() {
        assert_eq!(ProviderRegistry::mode(ProviderKind::GoogleDrive), ResolveMode::BuiltIn);
        assert_eq!(ProviderRegistry::mode(ProviderKind::Vidmoly), ResolveMode::BuiltIn);
        assert_eq!(ProviderRegistry::mode(ProviderKind::Direct), ResolveMode::Passthrough);
        assert_eq!(ProviderRegistry::mode(ProviderKind::Hls), ResolveMode::Passthrough);
        assert_eq!(ProviderRegistry::mode(ProviderKind::Voe), ResolveMode::Backend);
        assert_eq!(ProviderRegistry::mode(ProviderKind::Unknown), ResolveMode::Unsupported);
    }

    #[test]
    fn test_resolvers_match_providers() {
        for kind in [
            ProviderKind::GoogleDrive,
            ProviderKind::Vidmoly,
            ProviderKind::Direct,
            ProviderKind::Hls,
        ] {
            let resolver = ProviderRegistry::resolver(kind).unwrap();
            assert_eq!(resolver.provider(), kind);
        }
        assert!(ProviderRegistry::resolver(ProviderKind::Dood).is_none());
        assert!(ProviderRegistry::resolver(ProviderKind::Unknown).is_none());
    }

    #[test]
    fn test_backend_providers() {
        let kinds: Vec<_> = ProviderRegistry::with_mode(ResolveMode::Backend)
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(
            kinds,
            vec![ProviderKind::Voe, ProviderKind::Streamtape, ProviderKind::Dood]
        );
    }
}
