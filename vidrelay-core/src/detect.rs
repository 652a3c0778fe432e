//! Source detection.
//!
//! Classifies free-form user input (a URL, or text that embeds one, such as
//! an `<iframe src="...">` snippet) into a [`SourceReference`].
//!
//! Host rules are checked in a fixed priority order:
//!
//! 1. Google Drive (`id` query parameter, `/file/d/<id>`, `/download/<id>`)
//! 2. Vidmoly (last path segment, longer than five characters)
//! 3. VOE (last path segment)
//! 4. File extension (`.m3u8` is HLS, other media extensions are direct)
//! 5. Streamtape / DoodStream (whole URL)
//!
//! A rule that cannot produce a non-empty identifier falls through to the
//! next one.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::models::{ProviderKind, SourceReference};

/// How many times an embedded URL may be unwrapped.
const MAX_EMBED_DEPTH: u8 = 1;

/// Extensions served as plain files.
const DIRECT_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".mkv"];

/// A Vidmoly slug must be longer than this to count.
const MIN_VIDMOLY_SLUG_LEN: usize = 5;

/// HLS playlist extension.
const HLS_EXTENSION: &str = ".m3u8";

static FILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([^/?#&]+)").expect("Invalid regex"));

static DOWNLOAD_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/download/([^/?#&]+)").expect("Invalid regex"));

static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src=["']([^"']+)["']"#).expect("Invalid regex"));

static ABSOLUTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(https?://[^\s"'<>]+)"#).expect("Invalid regex"));

/// Classifies `input` into a [`SourceReference`].
///
/// Never fails: unrecognised input yields [`ProviderKind::Unknown`] with the
/// trimmed input as identifier.
pub fn detect_source(input: &str) -> SourceReference {
    detect_at_depth(input, 0)
}

/// Extracts the file id from a `/file/d/<id>` path anywhere in `text`.
pub fn drive_file_id_from_path(text: &str) -> Option<&str> {
    FILE_PATH_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

fn detect_at_depth(input: &str, depth: u8) -> SourceReference {
    let trimmed = input.trim();

    if let Some(url) = parse_absolute(trimmed) {
        return classify_url(&url, trimmed).unwrap_or_else(|| SourceReference::unknown(trimmed));
    }

    let bare = strip_query(trimmed).to_ascii_lowercase();
    if let Some(kind) = extension_kind(&bare) {
        return SourceReference::new(kind, trimmed, trimmed);
    }

    if depth < MAX_EMBED_DEPTH {
        if let Some(embedded) = find_embedded_url(trimmed) {
            let nested = detect_at_depth(embedded, depth + 1);
            if nested.is_known() {
                return nested;
            }
        }
    }

    SourceReference::unknown(trimmed)
}

fn parse_absolute(text: &str) -> Option<Url> {
    Url::parse(text)
        .ok()
        .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
}

fn classify_url(url: &Url, original: &str) -> Option<SourceReference> {
    let host = url.host_str()?.to_ascii_lowercase();

    if is_drive_host(&host) {
        if let Some(id) = drive_identifier(url) {
            return Some(SourceReference::new(ProviderKind::GoogleDrive, id, original));
        }
    }

    if host.contains("vidmoly") {
        if let Some(slug) = last_segment(url).filter(|s| s.len() > MIN_VIDMOLY_SLUG_LEN) {
            return Some(SourceReference::new(ProviderKind::Vidmoly, slug, original));
        }
    }

    if host.contains("voe") {
        if let Some(slug) = last_segment(url) {
            return Some(SourceReference::new(ProviderKind::Voe, slug, original));
        }
    }

    if let Some(kind) = extension_kind(&url.path().to_ascii_lowercase()) {
        return Some(SourceReference::new(kind, original, original));
    }

    if host.contains("streamtape") {
        return Some(SourceReference::new(ProviderKind::Streamtape, original, original));
    }

    if host.contains("dood") {
        return Some(SourceReference::new(ProviderKind::Dood, original, original));
    }

    None
}

fn is_drive_host(host: &str) -> bool {
    host.contains("drive.google.com") || host.contains("drive.usercontent.google.com")
}

fn drive_identifier(url: &Url) -> Option<String> {
    if let Some((_, id)) = url.query_pairs().find(|(k, v)| k == "id" && !v.is_empty()) {
        return Some(id.into_owned());
    }

    let path = url.path();
    drive_file_id_from_path(path)
        .or_else(|| {
            DOWNLOAD_PATH_RE
                .captures(path)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        })
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

fn extension_kind(lower_path: &str) -> Option<ProviderKind> {
    if lower_path.ends_with(HLS_EXTENSION) {
        return Some(ProviderKind::Hls);
    }
    DIRECT_EXTENSIONS
        .iter()
        .any(|ext| lower_path.ends_with(ext))
        .then_some(ProviderKind::Direct)
}

fn strip_query(text: &str) -> &str {
    text.split(['?', '#']).next().unwrap_or(text)
}

fn find_embedded_url(text: &str) -> Option<&str> {
    SRC_ATTR_RE
        .captures(text)
        .or_else(|| ABSOLUTE_URL_RE.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_query_id_beats_path() {
        let r = detect_source("https://drive.google.com/uc?export=download&id=QUERYID");
        assert_eq!(r.provider, ProviderKind::GoogleDrive);
        assert_eq!(r.identifier, "QUERYID");
    }

    #[test]
    fn test_drive_download_path() {
        let r = detect_source("https://drive.usercontent.google.com/download/abc123");
        assert_eq!(r.provider, ProviderKind::GoogleDrive);
        assert_eq!(r.identifier, "abc123");
    }

    #[test]
    fn test_drive_without_id_is_unknown() {
        let r = detect_source("https://drive.google.com/drive/my-drive");
        assert_eq!(r.provider, ProviderKind::Unknown);
    }

    #[test]
    fn test_vidmoly_slug() {
        let r = detect_source("https://vidmoly.to/embed-x1y2z3.html");
        assert_eq!(r.provider, ProviderKind::Vidmoly);
        assert_eq!(r.identifier, "embed-x1y2z3.html");
    }

    #[test]
    fn test_vidmoly_without_slug_falls_through() {
        let r = detect_source("https://vidmoly.me/");
        assert_eq!(r.provider, ProviderKind::Unknown);
    }

    #[test]
    fn test_short_vidmoly_slug_falls_through() {
        let r = detect_source("https://vidmoly.me/w/abc12");
        assert_eq!(r.provider, ProviderKind::Unknown);

        let r = detect_source("https://vidmoly.me/v.mp4");
        assert_eq!(r.provider, ProviderKind::Direct);
        assert_eq!(r.identifier, "https://vidmoly.me/v.mp4");

        let r = detect_source("https://vidmoly.me/w/abc123");
        assert_eq!(r.provider, ProviderKind::Vidmoly);
        assert_eq!(r.identifier, "abc123");
    }

    #[test]
    fn test_extension_checked_before_named_hosts() {
        let r = detect_source("https://streamtape.com/get/video.mp4");
        assert_eq!(r.provider, ProviderKind::Direct);
    }

    #[test]
    fn test_named_hosts_keep_whole_url() {
        let url = "https://dood.watch/e/abcdef";
        let r = detect_source(url);
        assert_eq!(r.provider, ProviderKind::Dood);
        assert_eq!(r.identifier, url);
    }

    #[test]
    fn test_bare_path_with_extension() {
        let r = detect_source("videos/clip.MKV?token=1");
        assert_eq!(r.provider, ProviderKind::Direct);
        assert_eq!(r.identifier, "videos/clip.MKV?token=1");
    }

    #[test]
    fn test_iframe_snippet_is_unwrapped() {
        let snippet = r#"<iframe src="https://voe.sx/e/k9k9k9" width="800"></iframe>"#;
        let r = detect_source(snippet);
        assert_eq!(r.provider, ProviderKind::Voe);
        assert_eq!(r.identifier, "k9k9k9");
        assert_eq!(r.original, "https://voe.sx/e/k9k9k9");
    }

    #[test]
    fn test_embedded_url_is_unwrapped_only_once() {
        // The attribute value is itself free text wrapping a URL; unwrapping
        // it would need a second level.
        let nested = r#"src="watch https://drive.google.com/file/d/abc/view""#;
        let r = detect_source(nested);
        assert_eq!(r.provider, ProviderKind::Unknown);
        assert_eq!(r.identifier, nested);
    }

    #[test]
    fn test_garbage_is_unknown() {
        let r = detect_source("  hello world  ");
        assert_eq!(r.provider, ProviderKind::Unknown);
        assert_eq!(r.identifier, "hello world");
        assert_eq!(r.original, "hello world");
    }

    #[test]
    fn test_drive_file_id_from_path() {
        assert_eq!(
            drive_file_id_from_path("https://drive.google.com/file/d/XYZ/view?usp=sharing"),
            Some("XYZ")
        );
        assert_eq!(drive_file_id_from_path("https://example.com/"), None);
    }
}
