//! Video lookup API client.

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};
use vidrelay_fetch::host::http::{ACCEPT_JSON, browser_headers};
use vidrelay_fetch::{FetchContext, FetchError, RedirectMode};

// ============================================================================
// API Response Types
// ============================================================================

/// Response from the lookup API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    /// Available renditions.
    #[serde(default)]
    pub videos: Vec<VideoSource>,
}

/// One rendition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoSource {
    /// Label such as `720p`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub quality: Option<String>,
    /// Media URL.
    #[serde(default)]
    pub url: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// API Client
// ============================================================================

/// Calls `{lookup_api}/{video_id}` with the watch page as Referer.
#[instrument(skip(ctx, origin))]
pub async fn lookup_sources(
    ctx: &FetchContext,
    video_id: &str,
    page_url: &str,
    origin: &str,
) -> Result<Vec<VideoSource>, FetchError> {
    let url = format!(
        "{}/{video_id}",
        ctx.settings.endpoints.vidmoly_lookup_api.trim_end_matches('/')
    );

    let mut headers = browser_headers(ACCEPT_JSON);
    headers.extend(page_headers(page_url, origin)?);
    let request = ctx.http.get(&url, RedirectMode::Follow).headers(headers);

    let response = ctx.http.send(request, ctx.settings.api_timeout).await?;
    if !response.status().is_success() {
        return Err(FetchError::UnexpectedStatus(response.status().as_u16()));
    }

    let body: LookupResponse = response.json().await?;
    debug!(count = body.videos.len(), "Lookup returned sources");
    Ok(body.videos)
}

/// Referer and Origin headers pointing at the watch page.
pub fn page_headers(page_url: &str, origin: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(page_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?,
    );
    headers.insert(
        header::ORIGIN,
        HeaderValue::from_str(origin).map_err(|e| FetchError::InvalidUrl(e.to_string()))?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup_response() {
        let json = r#"{"videos":[{"quality":"720p","url":"https://cdn/a.mp4"},{"quality":1080,"url":"https://cdn/b.mp4"},{"url":"https://cdn/c.mp4"}]}"#;
        let body: LookupResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.videos.len(), 3);
        assert_eq!(body.videos[0].quality.as_deref(), Some("720p"));
        assert_eq!(body.videos[1].quality.as_deref(), Some("1080"));
        assert_eq!(body.videos[2].quality, None);
    }

    #[test]
    fn test_missing_videos_is_empty() {
        let body: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(body.videos.is_empty());
    }
}
