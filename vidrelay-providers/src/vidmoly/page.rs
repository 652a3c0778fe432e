//! Watch page scraping.

use regex::Regex;
use std::sync::LazyLock;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)video_id['"]\s*[:=]\s*['"]([^'"&]+)"#).expect("Invalid regex")
});

static EMBED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vidmoly\.me/([a-zA-Z0-9]+)").expect("Invalid regex"));

/// Extracts the internal video id from a watch page.
///
/// A `video_id` assignment wins over a bare `vidmoly.me/<id>` link.
pub fn extract_video_id(html: &str) -> Option<&str> {
    VIDEO_ID_RE
        .captures(html)
        .or_else(|| EMBED_LINK_RE.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_assignment() {
        assert_eq!(extract_video_id(r#"var cfg = {"video_id": "abc123"};"#), Some("abc123"));
        assert_eq!(extract_video_id("{'video_id': 'xyz&foo'}"), Some("xyz"));
        assert_eq!(extract_video_id(r#"VIDEO_ID" : "Up""#), Some("Up"));
    }

    #[test]
    fn test_embed_link_fallback() {
        let html = r#"<a href="https://vidmoly.me/w9k2abc">watch</a>"#;
        assert_eq!(extract_video_id(html), Some("w9k2abc"));
    }

    #[test]
    fn test_assignment_beats_link() {
        let html = r#"<a href="https://vidmoly.me/linkid"></a><script>var p = {"video_id":"realid"}</script>"#;
        assert_eq!(extract_video_id(html), Some("realid"));
    }

    #[test]
    fn test_no_id() {
        assert_eq!(extract_video_id("<html>nothing here</html>"), None);
    }
}
