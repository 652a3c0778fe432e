//! Plain URL fetch-and-forward.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Response;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};
use vidrelay_core::{ProviderKind, ResolutionFailure};
use vidrelay_fetch::{FetchContext, RedirectMode, ResolvedStream, StreamResolver};

/// Longest upstream error body echoed back in failure details.
const MAX_ERROR_BODY: usize = 2048;

/// Fetches a URL that is already playable, following redirects.
#[derive(Debug, Clone, Copy)]
pub struct DirectResolver {
    kind: ProviderKind,
}

impl DirectResolver {
    /// Resolver for plain media files.
    pub fn direct() -> Self {
        Self {
            kind: ProviderKind::Direct,
        }
    }

    /// Resolver for HLS playlists.
    pub fn hls() -> Self {
        Self {
            kind: ProviderKind::Hls,
        }
    }
}

#[async_trait]
impl StreamResolver for DirectResolver {
    fn id(&self) -> &str {
        match self.kind {
            ProviderKind::Hls => "hls.passthrough",
            _ => "direct.passthrough",
        }
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    #[instrument(skip(self, ctx, range))]
    async fn resolve(
        &self,
        ctx: &FetchContext,
        identifier: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, ResolutionFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        if let Some(range) = range {
            let value = HeaderValue::from_str(range)
                .map_err(|_| ResolutionFailure::input("Invalid Range header"))?;
            headers.insert(header::RANGE, value);
        }

        let request = ctx
            .http
            .get(identifier, RedirectMode::Follow)
            .headers(headers);
        let response = ctx
            .http
            .send_streaming(request, ctx.settings.stream_timeout)
            .await
            .map_err(|e| {
                warn!(error = %e, "Direct fetch failed");
                ResolutionFailure::upstream("Could not fetch the source").with_details(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "Direct source answered with an error");
            let body = read_prefix(response, MAX_ERROR_BODY).await;
            let mut failure = ResolutionFailure::upstream("Could not retrieve the source")
                .with_status(status.as_u16());
            if !body.is_empty() {
                failure = failure.with_details(body);
            }
            return Err(failure);
        }

        Ok(ResolvedStream::from_response(response))
    }
}

/// Reads at most `max` bytes of the body; the rest is never pulled.
async fn read_prefix(response: Response, max: usize) -> String {
    let mut buf = Vec::new();
    let mut body = response.bytes_stream();
    while buf.len() < max {
        match body.next().await {
            Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
            Some(Err(e)) => {
                debug!(error = %e, "Error body read failed");
                break;
            }
            None => break,
        }
    }
    buf.truncate(max);
    utf8_prefix(&buf)
}

/// Decodes `bytes`, dropping a multi-byte character cut off at the end.
fn utf8_prefix(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
