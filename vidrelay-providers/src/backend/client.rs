//! External proxy backend client.
//!
//! Providers without a built-in resolver are delegated to a backend that
//! answers `POST {provider, source, identifier}` with `{playbackUrl}`.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use vidrelay_core::ProviderKind;
use vidrelay_fetch::{FetchContext, RedirectMode};

use super::error::BackendError;

/// Request body sent to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendRequest<'a> {
    /// Provider wire name.
    pub provider: &'a str,
    /// Source URL.
    pub source: &'a str,
    /// Provider identifier.
    pub identifier: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendResponse {
    #[serde(default)]
    playback_url: Option<serde_json::Value>,
}

/// Client for the external proxy backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    url: String,
}

impl BackendClient {
    /// Creates a client posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The backend URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Asks the backend for a playback URL.
    #[instrument(skip(self, ctx))]
    pub async fn playback_url(
        &self,
        ctx: &FetchContext,
        provider: ProviderKind,
        source: &str,
        identifier: &str,
    ) -> Result<String, BackendError> {
        let body = BackendRequest {
            provider: provider.as_str(),
            source,
            identifier,
        };
        let request = ctx
            .http
            .post(&self.url, RedirectMode::Follow)
            .json(&body);

        let response = ctx
            .http
            .send(request, ctx.settings.api_timeout)
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Proxy backend returned an error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: BackendResponse = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidPayload)?;
        match parsed.playback_url {
            Some(serde_json::Value::String(url)) => {
                debug!(url = %url, "Backend returned playback URL");
                Ok(url)
            }
            _ => Err(BackendError::InvalidPayload),
        }
    }
}
