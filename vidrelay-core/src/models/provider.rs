//! Provider-related types.
//!
//! - [`ProviderKind`] - Enum of supported provider families
//! - [`SourceReference`] - Result of classifying user input

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Provider Kind
// ============================================================================

/// Provider families recognised by the source detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Google Drive, the quota-gated host.
    GoogleDrive,
    /// Vidmoly, the generic third-party host.
    Vidmoly,
    /// VOE, the alternative host.
    Voe,
    /// A plain media file URL.
    Direct,
    /// An HLS playlist URL.
    Hls,
    /// Streamtape.
    Streamtape,
    /// DoodStream.
    Dood,
    /// Anything the detector could not place.
    Unknown,
}

impl ProviderKind {
    /// Returns the wire name used in query parameters and JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleDrive => "google-drive",
            Self::Vidmoly => "vidmoly",
            Self::Voe => "voe",
            Self::Direct => "direct",
            Self::Hls => "hls",
            Self::Streamtape => "streamtape",
            Self::Dood => "dood",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GoogleDrive => "Google Drive",
            Self::Vidmoly => "Vidmoly",
            Self::Voe => "VOE",
            Self::Direct => "Direct file",
            Self::Hls => "HLS playlist",
            Self::Streamtape => "Streamtape",
            Self::Dood => "DoodStream",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns all provider kinds, `Unknown` last.
    pub fn all() -> &'static [ProviderKind] {
        &[
            Self::GoogleDrive,
            Self::Vidmoly,
            Self::Voe,
            Self::Direct,
            Self::Hls,
            Self::Streamtape,
            Self::Dood,
            Self::Unknown,
        ]
    }

    /// Returns true for kinds whose identifier already is a playable URL.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Direct | Self::Hls)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownProvider(s.to_string()))
    }
}

// ============================================================================
// Source Reference
// ============================================================================

/// A classified video reference.
///
/// `identifier` is never empty unless `provider` is [`ProviderKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Detected provider family.
    pub provider: ProviderKind,
    /// Provider-specific key (file id, slug, or the whole URL).
    pub identifier: String,
    /// The text that was classified.
    pub original: String,
}

impl SourceReference {
    /// Creates a new reference.
    pub fn new(
        provider: ProviderKind,
        identifier: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            identifier: identifier.into(),
            original: original.into(),
        }
    }

    /// Creates the terminal fallback reference for unclassifiable input.
    pub fn unknown(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            provider: ProviderKind::Unknown,
            identifier: original.clone(),
            original,
        }
    }

    /// Returns true if the detector recognised a provider.
    pub fn is_known(&self) -> bool {
        self.provider != ProviderKind::Unknown
    }
}
