//! Files API metadata probe.

use serde::Deserialize;
use tracing::{debug, instrument};
use vidrelay_fetch::{FetchContext, FetchError, RedirectMode};
use vidrelay_fetch::host::http::{ACCEPT_JSON, browser_headers};

/// Fields requested from the files API.
pub const METADATA_FIELDS: &str = "name,size,mimeType,webContentLink,webViewLink";

/// Subset of a Drive file resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileMetadata {
    /// File name.
    #[serde(default)]
    pub name: Option<String>,
    /// Size in bytes, encoded as a string by the API.
    #[serde(default)]
    pub size: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Direct download link.
    #[serde(default)]
    pub web_content_link: Option<String>,
    /// Viewer link.
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Builds the metadata URL for `id`.
pub fn metadata_url(api_base: &str, id: &str, key: &str) -> String {
    format!("{api_base}/drive/v3/files/{id}?fields={METADATA_FIELDS}&key={key}")
}

/// Fetches file metadata. Non-2xx answers are errors.
#[instrument(skip(ctx, key))]
pub async fn fetch_metadata(
    ctx: &FetchContext,
    id: &str,
    key: &str,
) -> Result<DriveFileMetadata, FetchError> {
    let url = metadata_url(&ctx.settings.endpoints.drive_api_base, id, key);
    let request = ctx
        .http
        .get(&url, RedirectMode::Follow)
        .headers(browser_headers(ACCEPT_JSON));
    let response = ctx.http.send(request, ctx.settings.api_timeout).await?;

    if !response.status().is_success() {
        return Err(FetchError::UnexpectedStatus(response.status().as_u16()));
    }

    let metadata: DriveFileMetadata = response.json().await?;
    debug!(name = ?metadata.name, mime = ?metadata.mime_type, "Drive metadata fetched");
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_url() {
        assert_eq!(
            metadata_url("https://www.googleapis.com", "abc", "KEY"),
            "https://www.googleapis.com/drive/v3/files/abc?fields=name,size,mimeType,webContentLink,webViewLink&key=KEY"
        );
    }

    #[test]
    fn test_parse_partial_metadata() {
        let json = r#"{"name":"clip.mp4","mimeType":"video/mp4","webContentLink":"https://drive.google.com/uc?id=abc&export=download"}"#;
        let metadata: DriveFileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("clip.mp4"));
        assert_eq!(metadata.mime_type.as_deref(), Some("video/mp4"));
        assert!(metadata.web_content_link.is_some());
        assert!(metadata.size.is_none());
    }
}
