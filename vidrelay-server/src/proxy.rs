//! Resolve and stream phases.
//!
//! The resolve phase (`POST`) answers with a playback URL: the source itself
//! for passthrough providers, a stream URL on this server for built-in
//! providers, or whatever the external backend returns. The stream phase
//! (`GET ...?stream=1`) runs the provider's resolver and forwards the media.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use vidrelay_core::{ProviderKind, ResolutionFailure, detect_source};
use vidrelay_fetch::{FetchContext, FetchError, ResolvedStream, StreamResolver};
use vidrelay_providers::{
    BackendClient, DirectResolver, ProviderRegistry, ResolveMode, normalize_drive_id,
};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::forward;

/// Range requested when the caller sends none.
pub const DEFAULT_RANGE: &str = "bytes=0-";

// ============================================================================
// Request Types
// ============================================================================

/// Resolve-phase request. Each field falls back to the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveRequest {
    /// Provider wire name; detected from `source` when absent.
    pub provider: Option<String>,
    /// The user-supplied link.
    pub source: Option<String>,
    /// Provider identifier; detected from `source` when absent.
    pub identifier: Option<String>,
}

impl ResolveRequest {
    /// Fills missing fields from `query`.
    #[must_use]
    pub fn or_query(self, query: &ProxyQuery) -> Self {
        Self {
            provider: self.provider.or_else(|| query.provider.clone()),
            source: self.source.or_else(|| query.source.clone()),
            identifier: self.identifier.or_else(|| query.identifier.clone()),
        }
    }
}

/// Query string accepted on the mount path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyQuery {
    /// Any value selects the stream phase.
    pub stream: Option<String>,
    /// Provider wire name.
    pub provider: Option<String>,
    /// Provider identifier.
    pub identifier: Option<String>,
    /// Original source URL.
    pub source: Option<String>,
}

/// Resolve-phase success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResponse {
    /// URL the player should load.
    pub playback_url: String,
}

// ============================================================================
// Proxy State
// ============================================================================

/// Everything a request needs. Immutable once built.
#[derive(Debug)]
pub struct ProxyState {
    /// Fetch context shared by resolvers.
    pub ctx: FetchContext,
    /// Mount path, used to build stream URLs.
    pub mount_path: String,
    /// External backend, if configured.
    pub backend: Option<BackendClient>,
}

impl ProxyState {
    /// Creates a state.
    pub fn new(ctx: FetchContext, mount_path: impl Into<String>, backend: Option<BackendClient>) -> Self {
        Self {
            ctx,
            mount_path: mount_path.into(),
            backend,
        }
    }

    /// Builds a state from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, FetchError> {
        let ctx = FetchContext::with_settings(config.resolver_settings())?;
        Ok(Self::new(ctx, config.normalized_mount_path(), config.backend()))
    }

    /// Stream-phase URL on this server.
    pub fn stream_url(&self, provider: ProviderKind, identifier: &str) -> String {
        format!(
            "{}?stream=1&provider={}&identifier={}",
            self.mount_path,
            provider.as_str(),
            urlencoding::encode(identifier)
        )
    }

    fn require_backend(&self, provider: ProviderKind) -> Result<&BackendClient, ApiError> {
        self.backend.as_ref().ok_or_else(|| {
            ApiError::from(ResolutionFailure::unsupported(format!(
                "The {provider} provider requires the proxy service"
            )))
        })
    }
}

// ============================================================================
// Resolve Phase
// ============================================================================

/// Resolves `request` to a playback URL.
#[instrument(skip(state))]
pub async fn resolve_playback(state: &ProxyState, request: ResolveRequest) -> Result<String, ApiError> {
    let source = non_empty(request.source.as_deref())
        .ok_or_else(|| ApiError::bad_request("The source field is required"))?;

    let detected = detect_source(source);
    let provider = match non_empty(request.provider.as_deref()) {
        Some(name) => parse_provider(name)?,
        None => detected.provider,
    };
    let identifier = non_empty(request.identifier.as_deref())
        .or_else(|| non_empty(Some(&detected.identifier)))
        .unwrap_or(source);
    debug!(provider = %provider, identifier, "Resolving source");

    match ProviderRegistry::mode(provider) {
        ResolveMode::Unsupported => Err(ApiError::bad_request("Unsupported source link")),
        ResolveMode::Passthrough => Ok(source.to_string()),
        ResolveMode::BuiltIn => {
            let key = builtin_key(provider, identifier)?;
            Ok(state.stream_url(provider, key))
        }
        ResolveMode::Backend => {
            let backend = state.require_backend(provider)?;
            let url = backend
                .playback_url(&state.ctx, provider, source, identifier)
                .await
                .map_err(|e| ApiError::from(ResolutionFailure::from(e)))?;
            Ok(url)
        }
    }
}

/// The key a built-in provider's stream phase expects.
fn builtin_key(provider: ProviderKind, identifier: &str) -> Result<&str, ApiError> {
    match provider {
        ProviderKind::Vidmoly => identifier
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .ok_or_else(|| ApiError::bad_request("Invalid Vidmoly link")),
        ProviderKind::GoogleDrive => normalize_drive_id(identifier)
            .ok_or_else(|| ApiError::bad_request("Could not resolve the Google Drive id")),
        _ => Ok(identifier),
    }
}

// ============================================================================
// Stream Phase
// ============================================================================

/// Runs the stream phase for `query`, returning the upstream stream unforwarded.
#[instrument(skip(state, query), fields(provider = ?query.provider))]
pub async fn open_stream(
    state: &ProxyState,
    query: &ProxyQuery,
    range: Option<&str>,
) -> Result<ResolvedStream, ApiError> {
    if query.stream.is_none() {
        return Err(ApiError::bad_request("Invalid request"));
    }
    let (Some(provider), Some(identifier)) = (
        non_empty(query.provider.as_deref()),
        non_empty(query.identifier.as_deref()),
    ) else {
        return Err(ApiError::bad_request(
            "The provider and identifier parameters are required",
        ));
    };

    let provider = parse_provider(provider)?;
    let range = non_empty(range).unwrap_or(DEFAULT_RANGE);
    let remote = non_empty(query.source.as_deref()).unwrap_or(identifier);

    let stream = match ProviderRegistry::mode(provider) {
        ResolveMode::BuiltIn => {
            let key = match provider {
                ProviderKind::GoogleDrive => normalize_drive_id(identifier)
                    .ok_or_else(|| ApiError::bad_request("Invalid Google Drive id format"))?,
                _ => identifier,
            };
            resolve_with(&state.ctx, provider, key, range).await?
        }
        ResolveMode::Passthrough => resolve_with(&state.ctx, provider, remote, range).await?,
        ResolveMode::Backend | ResolveMode::Unsupported => {
            let backend = state.require_backend(provider)?;
            let playback_url = backend
                .playback_url(&state.ctx, provider, remote, identifier)
                .await
                .map_err(|e| ApiError::from(ResolutionFailure::from(e)))?;
            info!(url = %playback_url, "Proxying backend playback URL");
            DirectResolver::direct()
                .resolve(&state.ctx, &playback_url, Some(range))
                .await?
        }
    };
    Ok(stream)
}

async fn resolve_with(
    ctx: &FetchContext,
    provider: ProviderKind,
    identifier: &str,
    range: &str,
) -> Result<ResolvedStream, ApiError> {
    let resolver = ProviderRegistry::resolver(provider).ok_or_else(|| {
        ApiError::from(ResolutionFailure::unsupported(format!(
            "No resolver for {provider}"
        )))
    })?;
    debug!(resolver = resolver.id(), "Dispatching to resolver");
    resolver
        .resolve(ctx, identifier, Some(range))
        .await
        .map_err(|failure| {
            warn!(kind = failure.kind.as_str(), message = %failure.message, "Resolution failed");
            ApiError::from(failure)
        })
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST {mount}`.
pub async fn resolve_handler(
    State(state): State<Arc<ProxyState>>,
    Query(query): Query<ProxyQuery>,
    body: Bytes,
) -> Result<Json<PlaybackResponse>, ApiError> {
    // A missing or malformed body is allowed; the query string fills in.
    let request = serde_json::from_slice::<ResolveRequest>(&body)
        .unwrap_or_default()
        .or_query(&query);
    let playback_url = resolve_playback(&state, request).await?;
    Ok(Json(PlaybackResponse { playback_url }))
}

/// `GET {mount}?stream=1&...`.
pub async fn stream_handler(
    State(state): State<Arc<ProxyState>>,
    Query(query): Query<ProxyQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let stream = open_stream(&state, &query, range).await?;
    forward::forward(stream)
}

/// `OPTIONS {mount}`.
pub async fn preflight_handler() -> Response {
    forward::preflight()
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_provider(name: &str) -> Result<ProviderKind, ApiError> {
    name.parse()
        .map_err(|_| ApiError::bad_request(format!("Unsupported provider: {name}")))
}
