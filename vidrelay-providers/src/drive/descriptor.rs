//! Google Drive provider descriptor.

use std::sync::Arc;

use vidrelay_core::ProviderKind;
use vidrelay_fetch::StreamResolver;

use super::resolver::DriveResolver;
use crate::descriptor::{ProviderDescriptor, ResolveMode};

/// Creates the Google Drive provider descriptor.
pub fn drive_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::GoogleDrive,
        mode: ResolveMode::BuiltIn,
        summary: "Download cascade with confirmation-page handling",
        build_resolver: Some(build_drive_resolver),
    }
}

fn build_drive_resolver() -> Arc<dyn StreamResolver> {
    Arc::new(DriveResolver::new())
}
