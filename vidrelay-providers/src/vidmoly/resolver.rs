//! Vidmoly scrape-then-API resolver.

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use tracing::{debug, info, instrument};
use vidrelay_core::{ProviderKind, ResolutionFailure};
use vidrelay_fetch::host::http::{ACCEPT_DOCUMENT, ACCEPT_MEDIA, browser_headers};
use vidrelay_fetch::{FetchContext, FetchError, RedirectMode, ResolvedStream, StreamResolver};

use super::api::{lookup_sources, page_headers};
use super::error::VidmolyError;
use super::page::extract_video_id;
use super::quality::select_best;

/// Referer sent with the watch page request.
const SEARCH_REFERER: &str = "https://www.google.com/";

/// Resolves a Vidmoly slug to its best rendition.
///
/// Every step runs once; the first failure ends the resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct VidmolyResolver;

impl VidmolyResolver {
    /// Creates a new resolver.
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, ctx, range))]
    async fn resolve_slug(
        &self,
        ctx: &FetchContext,
        slug: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, VidmolyError> {
        let slug = slug.trim().trim_matches('/');
        if slug.is_empty() {
            return Err(VidmolyError::InvalidSlug);
        }

        let origin = ctx.settings.endpoints.vidmoly_origin.trim_end_matches('/');
        let page_url = format!("{origin}/{slug}");

        // Step 1: watch page
        let html = self
            .fetch_page(ctx, &page_url)
            .await
            .map_err(VidmolyError::PageFetch)?;

        // Step 2: internal video id
        let video_id = extract_video_id(&html).ok_or(VidmolyError::VideoIdNotFound)?;
        debug!(video_id, "Extracted video id");

        // Step 3: lookup
        let sources = lookup_sources(ctx, video_id, &page_url, origin)
            .await
            .map_err(VidmolyError::Lookup)?;

        // Step 4: best rendition
        let best = select_best(&sources).ok_or(VidmolyError::NoSources)?;
        let video_url = best.url.as_deref().ok_or(VidmolyError::NoSources)?;
        info!(quality = ?best.quality, url = %video_url, "Selected rendition");

        // Step 5: media
        self.fetch_media(ctx, video_url, &page_url, origin, range)
            .await
            .map_err(VidmolyError::Stream)
    }

    async fn fetch_page(&self, ctx: &FetchContext, page_url: &str) -> Result<String, FetchError> {
        let mut headers = browser_headers(ACCEPT_DOCUMENT);
        headers.insert(header::REFERER, HeaderValue::from_static(SEARCH_REFERER));
        let request = ctx.http.get(page_url, RedirectMode::Follow).headers(headers);

        let response = ctx.http.send(request, ctx.settings.page_timeout).await?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn fetch_media(
        &self,
        ctx: &FetchContext,
        video_url: &str,
        page_url: &str,
        origin: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, FetchError> {
        let mut headers = browser_headers(ACCEPT_MEDIA);
        headers.extend(page_headers(page_url, origin)?);
        headers.insert(
            header::RANGE,
            HeaderValue::from_str(range.unwrap_or("bytes=0-"))
                .map_err(|e| FetchError::InvalidResponse(e.to_string()))?,
        );
        let request = ctx.http.get(video_url, RedirectMode::Follow).headers(headers);

        let response = ctx
            .http
            .send_streaming(request, ctx.settings.stream_timeout)
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(ResolvedStream::from_response(response))
    }
}

#[async_trait]
impl StreamResolver for VidmolyResolver {
    fn id(&self) -> &str {
        "vidmoly.lookup"
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Vidmoly
    }

    async fn resolve(
        &self,
        ctx: &FetchContext,
        identifier: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, ResolutionFailure> {
        Ok(self.resolve_slug(ctx, identifier, range).await?)
    }
}
