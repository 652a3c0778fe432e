//! Stream resolver trait.
//!
//! A resolver turns a provider-specific identifier into a live media
//! response. Each built-in provider implements this trait; the server holds
//! them behind `Arc<dyn StreamResolver>`.

use async_trait::async_trait;
use vidrelay_core::{ProviderKind, ResolutionFailure};

use crate::context::FetchContext;
use crate::stream::ResolvedStream;

// ============================================================================
// Stream Resolver Trait
// ============================================================================

/// Resolves an identifier to a forwardable media stream.
///
/// ## Implementing a Resolver
///
/// ```ignore
/// struct PassthroughResolver;
///
/// #[async_trait]
/// impl StreamResolver for PassthroughResolver {
///     fn id(&self) -> &str {
///         "direct.passthrough"
///     }
///
///     fn provider(&self) -> ProviderKind {
///         ProviderKind::Direct
///     }
///
///     async fn resolve(
///         &self,
///         ctx: &FetchContext,
///         identifier: &str,
///         range: Option<&str>,
///     ) -> Result<ResolvedStream, ResolutionFailure> {
///         // Fetch `identifier` with the Range header and wrap the response
///     }
/// }
/// ```
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Unique identifier, formatted `{provider}.{method}`.
    fn id(&self) -> &str;

    /// The provider this resolver serves.
    fn provider(&self) -> ProviderKind;

    /// Human-readable name for this resolver.
    fn display_name(&self) -> String {
        self.provider().display_name().to_string()
    }

    /// Resolves `identifier`, forwarding `range` to the upstream.
    ///
    /// Never panics on upstream misbehaviour; every failure is reported as a
    /// [`ResolutionFailure`].
    async fn resolve(
        &self,
        ctx: &FetchContext,
        identifier: &str,
        range: Option<&str>,
    ) -> Result<ResolvedStream, ResolutionFailure>;
}

impl std::fmt::Debug for dyn StreamResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResolver")
            .field("id", &self.id())
            .field("provider", &self.provider())
            .finish()
    }
}
