//! Google Drive cascade resolver.
//!
//! Resolution runs in three phases:
//!
//! 1. Walk the approach cascade until one yields a final URL (a redirect, a
//!    submitted confirmation form, or a direct media answer).
//! 2. With an API key, probe file metadata and try its `webContentLink`.
//! 3. Fetch the final URL, handling confirmation pages, viewer redirects,
//!    confirm-token redirects and external redirects, with bounded retries.
//!
//! Viewer redirects re-enter the whole resolver with the new id. The depth
//! is threaded explicitly and capped by `max_redirect_depth`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Response;
use tracing::{debug, info, instrument, warn};
use url::Url;
use vidrelay_core::{ProviderKind, ResolutionFailure, drive_file_id_from_path};
use vidrelay_fetch::host::http::ACCEPT_MEDIA;
use vidrelay_fetch::stream::{has_attachment_filename, is_media_type};
use vidrelay_fetch::{
    AttemptLog, AttemptOutcome, CookieJar, FetchContext, RedirectMode, ResolvedStream,
    ResponseExt, RetryPolicy, StreamResolver,
};

use super::approaches::{ResolutionApproach, build_approaches, normalize_drive_id};
use super::error::DriveError;
use super::interstitial::{InterstitialParser, RegexInterstitialParser};
use super::metadata::fetch_metadata;

/// Accept header for the final media fetch.
const ACCEPT_VIDEO: &str = "video/*, */*";

// ============================================================================
// Resolver
// ============================================================================

/// Multi-approach resolver for Google Drive files.
#[derive(Clone)]
pub struct DriveResolver {
    parser: Arc<dyn InterstitialParser>,
}

impl DriveResolver {
    /// Creates a resolver using the default interstitial parser.
    pub fn new() -> Self {
        Self::with_parser(Arc::new(RegexInterstitialParser))
    }

    /// Creates a resolver with a custom interstitial parser.
    pub fn with_parser(parser: Arc<dyn InterstitialParser>) -> Self {
        Self { parser }
    }

    /// Resolves `id` at the given viewer-redirect depth.
    fn resolve_at_depth<'a>(
        &'a self,
        ctx: &'a FetchContext,
        id: String,
        range: Option<&'a str>,
        depth: u8,
    ) -> BoxFuture<'a, Result<ResolvedStream, DriveError>> {
        async move {
            info!(id = %id, depth, "Resolving Google Drive file");
            let mut jar = CookieJar::new();

            let final_url = self.find_final_url(ctx, &id, range, &mut jar).await?;
            info!(final_url = %final_url, "Final URL obtained");

            if let Some(stream) = self.probe_metadata(ctx, &id, range).await {
                return Ok(stream);
            }

            self.fetch_final(ctx, &id, &final_url, range, &mut jar, depth)
                .await
        }
        .boxed()
    }

    // ========================================================================
    // Phase 1: approach cascade
    // ========================================================================

    #[instrument(skip(self, ctx, range, jar))]
    async fn find_final_url(
        &self,
        ctx: &FetchContext,
        id: &str,
        range: Option<&str>,
        jar: &mut CookieJar,
    ) -> Result<String, DriveError> {
        let policy = ctx.retry_policy();
        let mut log = AttemptLog::new();

        for approach in build_approaches(&ctx.settings, id) {
            debug!(approach = approach.name, "Trying approach");
            let started = Instant::now();
            let request_url = approach.cache_busted_url();

            let result = policy
                .send_with_retry(approach.name, || {
                    let request = ctx
                        .http
                        .get(&request_url, RedirectMode::Manual)
                        .headers(approach_headers(ctx, range, jar));
                    ctx.http.send(request, ctx.settings.stream_timeout)
                })
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    warn!(approach = approach.name, error = %e, "Approach failed");
                    log.push(approach.name, AttemptOutcome::Error(e.to_string()), started.elapsed());
                    continue;
                }
            };

            jar.absorb(response.headers());
            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = resolve_location(&response, &request_url) {
                    log.push(approach.name, AttemptOutcome::Redirected(location.clone()), started.elapsed());
                    return Ok(location);
                }
            }

            if status.is_success() && response.is_html() {
                log.push(approach.name, AttemptOutcome::Interstitial, started.elapsed());
                if let Some(location) = self.submit_cascade_form(ctx, id, &approach, response, jar).await {
                    return Ok(location);
                }
                continue;
            }

            if status.is_success() && is_media_response(&response) {
                log.push(approach.name, AttemptOutcome::Media, started.elapsed());
                return Ok(approach.url);
            }

            log.push(approach.name, AttemptOutcome::Status(status.as_u16()), started.elapsed());
        }

        warn!(attempts = log.len(), "All download approaches failed");
        Err(DriveError::AllApproachesFailed {
            attempts: log.summary(),
        })
    }

    /// Submits the confirmation form found on an approach's HTML answer.
    /// Returns the redirect target on success.
    async fn submit_cascade_form(
        &self,
        ctx: &FetchContext,
        id: &str,
        approach: &ResolutionApproach,
        response: Response,
        jar: &mut CookieJar,
    ) -> Option<String> {
        let html = response.text().await.ok()?;
        let Some(form) = self.parser.parse_form(&html) else {
            debug!(approach = approach.name, "No confirmation form in HTML answer");
            return None;
        };

        let form_url = Url::parse(&approach.url).ok()?.join(&form.action).ok()?;
        debug!(form_url = %form_url, "Submitting confirmation form");
        tokio::time::sleep(ctx.settings.form_submit_delay).await;

        let mut headers = form_headers(ctx, jar);
        headers.insert(header::REFERER, header_value(&approach.url)?);

        let request = ctx
            .http
            .post(form_url.as_str(), RedirectMode::Manual)
            .headers(headers)
            .form(&[
                ("confirm", form.confirm.as_str()),
                ("id", id),
                ("export", "download"),
            ]);

        let submitted = match ctx.http.send(request, ctx.settings.stream_timeout).await {
            Ok(submitted) => submitted,
            Err(e) => {
                warn!(error = %e, "Form submission failed");
                return None;
            }
        };
        jar.absorb(submitted.headers());

        if submitted.status().is_redirection() {
            let location = resolve_location(&submitted, form_url.as_str());
            if let Some(ref location) = location {
                debug!(location = %location, "Form submission redirected");
            }
            return location;
        }

        debug!(status = %submitted.status(), "Form submission did not redirect");
        None
    }

    // ========================================================================
    // Phase 2: metadata probe
    // ========================================================================

    /// Best effort; every failure falls through to phase 3.
    async fn probe_metadata(
        &self,
        ctx: &FetchContext,
        id: &str,
        range: Option<&str>,
    ) -> Option<ResolvedStream> {
        let key = ctx.settings.usable_api_key()?;

        let metadata = match fetch_metadata(ctx, id, key).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(error = %e, "Metadata probe failed, continuing");
                return None;
            }
        };

        let link = metadata.web_content_link?;
        debug!(link = %link, "Trying webContentLink");

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::RANGE, header_value(range.unwrap_or("bytes=0-"))?);
        let request = ctx.http.get(&link, RedirectMode::Follow).headers(headers);

        match ctx.http.send_streaming(request, ctx.settings.stream_timeout).await {
            Ok(response) if response.status().is_success() && !response.is_html() => {
                info!("Streaming from webContentLink");
                Some(ResolvedStream::from_response(response).with_cors())
            }
            Ok(response) => {
                debug!(status = %response.status(), "webContentLink unusable");
                None
            }
            Err(e) => {
                debug!(error = %e, "webContentLink fetch failed");
                None
            }
        }
    }

    // ========================================================================
    // Phase 3: final URL fetch
    // ========================================================================

    #[instrument(skip(self, ctx, range, jar))]
    async fn fetch_final(
        &self,
        ctx: &FetchContext,
        id: &str,
        final_url: &str,
        range: Option<&str>,
        jar: &mut CookieJar,
        depth: u8,
    ) -> Result<ResolvedStream, DriveError> {
        let policy = ctx.retry_policy();
        let retries = policy.max_attempts;
        let mut log = AttemptLog::new();

        for attempt in 1..=retries {
            debug!(attempt, retries, url = %final_url, "Fetching final URL");
            let started = Instant::now();

            let request = ctx
                .http
                .get(final_url, RedirectMode::Manual)
                .headers(media_headers(ctx, range, jar));

            let response = match ctx.http.send_streaming(request, ctx.settings.stream_timeout).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(attempt, error = %e, "Final URL fetch failed");
                    log.push("final", AttemptOutcome::Error(e.to_string()), started.elapsed());
                    continue;
                }
            };
            jar.absorb(response.headers());
            let status = response.status();

            if status.is_success() {
                if response.is_html() {
                    log.push("final", AttemptOutcome::Interstitial, started.elapsed());
                    if let Some(stream) = self.submit_final_form(ctx, id, response, jar).await {
                        return Ok(stream);
                    }
                    continue;
                }
                if is_media_response(&response) {
                    info!(status = %status, content_type = %response.content_type(), "Streaming final URL");
                    return Ok(ResolvedStream::from_response(response)
                        .force_video_type()
                        .with_cors());
                }
                warn!(content_type = %response.content_type(), "Unexpected content type");
                log.push("final", AttemptOutcome::Status(status.as_u16()), started.elapsed());
                continue;
            }

            if RetryPolicy::is_retryable_status(status) {
                let delay = policy.delay_for(response.retry_after_secs());
                warn!(status = %status, delay_ms = delay.as_millis(), "Upstream throttled, backing off");
                log.push("final", AttemptOutcome::Status(status.as_u16()), started.elapsed());
                drop(response);
                if attempt < retries {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            if status.is_redirection() {
                let Some(location) = resolve_location(&response, final_url) else {
                    log.push("final", AttemptOutcome::Status(status.as_u16()), started.elapsed());
                    continue;
                };
                log.push("final", AttemptOutcome::Redirected(location.clone()), started.elapsed());

                match self.follow_final_redirect(ctx, id, &location, range, depth).await {
                    RedirectResult::Stream(stream) => return Ok(stream),
                    RedirectResult::Failed(err) => return Err(err),
                    RedirectResult::Continue(reason) => {
                        debug!(reason, "Redirect did not yield media");
                        log.push("redirect", AttemptOutcome::Error(reason.to_string()), started.elapsed());
                        continue;
                    }
                }
            }

            log.push("final", AttemptOutcome::Status(status.as_u16()), started.elapsed());
        }

        let last = log
            .last_failure()
            .map_or_else(|| "no response".to_string(), |a| a.outcome.to_string());
        warn!(retries, last = %last, "Final URL fetch exhausted");
        Err(DriveError::FinalFetchFailed { retries, last })
    }

    /// Re-submits a confirmation form met during the final fetch, following
    /// redirects.
    async fn submit_final_form(
        &self,
        ctx: &FetchContext,
        id: &str,
        response: Response,
        jar: &CookieJar,
    ) -> Option<ResolvedStream> {
        let html = response.text().await.ok()?;
        let form = self.parser.parse_form(&html)?;
        let origin = &ctx.settings.endpoints.drive_origin;
        let form_url = Url::parse(origin).ok()?.join(&form.action).ok()?;
        debug!(form_url = %form_url, "Submitting confirmation form from final URL");

        let mut headers = form_headers(ctx, jar);
        headers.insert(
            header::REFERER,
            header_value(&format!("{origin}/uc?export=download&id={id}"))?,
        );

        let request = ctx
            .http
            .post(form_url.as_str(), RedirectMode::Follow)
            .headers(headers)
            .form(&[("confirm", form.confirm.as_str())]);

        let submitted = ctx
            .http
            .send_streaming(request, ctx.settings.stream_timeout)
            .await
            .ok()?;
        (submitted.status().is_success() && !submitted.is_html())
            .then(|| ResolvedStream::from_response(submitted).with_cors())
    }

    async fn follow_final_redirect(
        &self,
        ctx: &FetchContext,
        id: &str,
        location: &str,
        range: Option<&str>,
        depth: u8,
    ) -> RedirectResult {
        let origin = &ctx.settings.endpoints.drive_origin;
        let internal = is_drive_url(location, origin);

        if internal {
            if let Some(new_id) = drive_file_id_from_path(location) {
                if depth >= ctx.settings.max_redirect_depth {
                    warn!(depth, "Viewer redirect depth exceeded");
                    return RedirectResult::Continue("viewer redirect depth exceeded");
                }
                info!(new_id, "Redirected to viewer, resolving again");
                return match self
                    .resolve_at_depth(ctx, new_id.to_string(), range, depth + 1)
                    .await
                {
                    Ok(stream) => RedirectResult::Stream(stream),
                    Err(err) => RedirectResult::Failed(err),
                };
            }

            if location.contains("uc?") {
                if let Some(token) = self.parser.confirm_token(location) {
                    let url = format!("{origin}/uc?export=download&id={id}&confirm={token}");
                    debug!(url = %url, "Retrying with confirm token");
                    let Some(headers) = redirect_headers(ctx, None) else {
                        return RedirectResult::Continue("invalid header");
                    };
                    let request = ctx.http.get(&url, RedirectMode::Follow).headers(headers);
                    return match ctx.http.send_streaming(request, ctx.settings.stream_timeout).await {
                        Ok(r) if r.status().is_success() && !r.is_html() => {
                            RedirectResult::Stream(
                                ResolvedStream::from_response(r).force_video_type().with_cors(),
                            )
                        }
                        _ => RedirectResult::Continue("confirm token fetch did not yield media"),
                    };
                }
            }

            return RedirectResult::Continue("unhandled internal redirect");
        }

        debug!(location, "Following external redirect");
        let Some(headers) = redirect_headers(ctx, range) else {
            return RedirectResult::Continue("invalid header");
        };
        let request = ctx.http.get(location, RedirectMode::Follow).headers(headers);
        match ctx.http.send_streaming(request, ctx.settings.stream_timeout).await {
            Ok(r) if r.status().is_success() && !r.is_html() => {
                RedirectResult::Stream(ResolvedStream::from_response(r).with_cors())
            }
            Ok(r) => {
                debug!(status = %r.status(), "External redirect unusable");
                RedirectResult::Continue("external redirect did not yield media")
            }
            Err(e) => {
                debug!(error = %e, "External redirect failed");
                RedirectResult::Continue("external redirect failed")
            }
        }
    }
}

impl Default for DriveResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DriveResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl StreamResolver for DriveResolver {
    fn id(&self) -> &str {
        "google-drive.cascade"
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::GoogleDrive
    }

    async fn resolve(
        &self,
        ctx: &FetchContext,
        identifier: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, ResolutionFailure> {
        let id = normalize_drive_id(identifier)
            .ok_or_else(|| DriveError::InvalidId(identifier.to_string()))?;
        Ok(self.resolve_at_depth(ctx, id.to_string(), range, 0).await?)
    }
}

enum RedirectResult {
    Stream(ResolvedStream),
    Failed(DriveError),
    Continue(&'static str),
}

// ============================================================================
// Helpers
// ============================================================================

fn header_value(value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(value).ok()
}

fn drive_referer(ctx: &FetchContext) -> Option<HeaderValue> {
    header_value(&format!("{}/", ctx.settings.endpoints.drive_origin))
}

fn approach_headers(ctx: &FetchContext, range: Option<&str>, jar: &CookieJar) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    if let Some(referer) = drive_referer(ctx) {
        headers.insert(header::REFERER, referer);
    }
    if let Some(range) = range.and_then(header_value) {
        headers.insert(header::RANGE, range);
    }
    if let Some(cookie) = jar.header_value() {
        headers.insert(header::COOKIE, cookie);
    }
    headers
}

fn form_headers(ctx: &FetchContext, jar: &CookieJar) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    if let Some(origin) = header_value(&ctx.settings.endpoints.drive_origin) {
        headers.insert(header::ORIGIN, origin);
    }
    if let Some(cookie) = jar.header_value() {
        headers.insert(header::COOKIE, cookie);
    }
    headers
}

fn media_headers(ctx: &FetchContext, range: Option<&str>, jar: &CookieJar) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_VIDEO));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("video"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("no-cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
    if let Some(referer) = drive_referer(ctx) {
        headers.insert(header::REFERER, referer);
    }
    if let Some(origin) = header_value(&ctx.settings.endpoints.drive_origin) {
        headers.insert(header::ORIGIN, origin);
    }
    if let Some(range) = range.and_then(header_value) {
        headers.insert(header::RANGE, range);
    }
    if let Some(cookie) = jar.header_value() {
        headers.insert(header::COOKIE, cookie);
    }
    headers
}

/// Headers for redirect targets: drive Referer/Origin, no cookies.
fn redirect_headers(ctx: &FetchContext, range: Option<&str>) -> Option<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA));
    headers.insert(header::REFERER, drive_referer(ctx)?);
    headers.insert(header::ORIGIN, header_value(&ctx.settings.endpoints.drive_origin)?);
    if let Some(range) = range {
        headers.insert(header::RANGE, header_value(range)?);
    }
    Some(headers)
}

/// Resolves a `Location` header against the URL that produced it.
fn resolve_location(response: &Response, base: &str) -> Option<String> {
    let location = response.location()?;
    let resolved = Url::parse(base)
        .and_then(|b| b.join(&location))
        .map_or(location, |u| u.to_string());
    Some(resolved)
}

fn is_media_response(response: &Response) -> bool {
    is_media_type(&response.content_type()) || has_attachment_filename(response.headers())
}

fn is_drive_url(url: &str, origin: &str) -> bool {
    if url.starts_with(origin) {
        return true;
    }
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host.contains("drive.google.com"))
}
