//! Router assembly and server loop.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::proxy::{self, ProxyState};

/// Shared handler state.
pub type AppState = Arc<ProxyState>;

/// Builds the router serving `state.mount_path`.
pub fn router(state: AppState) -> Router {
    let mount = state.mount_path.clone();
    Router::new()
        .route(
            &mount,
            get(proxy::stream_handler)
                .post(proxy::resolve_handler)
                .options(proxy::preflight_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the HTTP server until `shutdown` completes.
pub async fn run_server<F>(config: &ServerConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(ProxyState::from_config(config)?);
    let app = router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        mount = %state.mount_path,
        backend = state.backend.as_ref().map(|b| b.url()),
        "Proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Proxy stopped");
    Ok(())
}
