//! Download approaches tried in order to obtain a final URL.

use regex::Regex;
use std::sync::LazyLock;
use vidrelay_fetch::ResolverSettings;

static DRIVE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w-]{20,}").expect("Invalid regex"));

/// One entry of the download cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionApproach {
    /// Short name used in logs and attempt summaries.
    pub name: &'static str,
    /// URL requested, before the cache-buster is appended.
    pub url: String,
    /// Whether the URL targets the key-authenticated files API.
    pub uses_authenticated_api: bool,
}

impl ResolutionApproach {
    fn new(name: &'static str, url: String, uses_authenticated_api: bool) -> Self {
        Self {
            name,
            url,
            uses_authenticated_api,
        }
    }

    /// The URL with a fresh random `uuid` query parameter appended.
    pub fn cache_busted_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}uuid={}", self.url, uuid::Uuid::new_v4())
    }
}

/// Builds the ordered cascade for `id`.
///
/// The authenticated API comes first, and only when a usable key is set.
pub fn build_approaches(settings: &ResolverSettings, id: &str) -> Vec<ResolutionApproach> {
    let origin = &settings.endpoints.drive_origin;
    let mut approaches = Vec::with_capacity(5);

    if let Some(key) = settings.usable_api_key() {
        approaches.push(ResolutionApproach::new(
            "drive-api",
            format!(
                "{}/drive/v3/files/{id}?alt=media&key={key}",
                settings.endpoints.drive_api_base
            ),
            true,
        ));
    }

    approaches.extend([
        ResolutionApproach::new(
            "confirmed-download-uuid",
            format!("{origin}/uc?export=download&id={id}&confirm=t&uuid="),
            false,
        ),
        ResolutionApproach::new(
            "confirmed-download",
            format!("{origin}/uc?export=download&id={id}&confirm=t"),
            false,
        ),
        ResolutionApproach::new(
            "standard-download",
            format!("{origin}/uc?export=download&id={id}"),
            false,
        ),
        ResolutionApproach::new("view", format!("{origin}/uc?export=view&id={id}"), false),
    ]);

    approaches
}

/// Extracts the first run of 20+ word characters or dashes, the shape of a
/// Drive file id.
pub fn normalize_drive_id(text: &str) -> Option<&str> {
    DRIVE_ID_RE.find(text).map(|m| m.as_str())
}
