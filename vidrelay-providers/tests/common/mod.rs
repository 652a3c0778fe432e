//! Scripted local upstream for resolver integration tests.
//!
//! Each test builds an axum router for the upstream behaviour it needs and
//! serves it on `127.0.0.1:0`. Handlers record hits so tests can assert the
//! exact number of network calls a resolution made.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use futures::StreamExt;
use vidrelay_fetch::{Endpoints, FetchContext, ResolvedStream, ResolverSettings};

/// Starts `router` on an ephemeral port and returns its base URL
/// (e.g. `http://127.0.0.1:12345`). The server runs until the test ends.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Per-route hit counters plus an ordered request log.
#[derive(Debug, Clone, Default)]
pub struct Hits {
    total: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Hits {
    /// Records a hit labelled `label` and returns how many hits that label
    /// had before this one.
    pub fn record(&self, label: &str) -> usize {
        self.total.fetch_add(1, Ordering::SeqCst);
        let mut log = self.log.lock().unwrap();
        let previous = log.iter().filter(|l| *l == label).count();
        log.push(label.to_string());
        previous
    }

    /// Hits for one label.
    pub fn count(&self, label: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|l| *l == label).count()
    }

    /// All hits.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Labels in request order.
    pub fn sequence(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

/// Settings pointing every endpoint at `base`, with no artificial waits.
pub fn fast_settings(base: &str) -> ResolverSettings {
    ResolverSettings::default()
        .with_endpoints(Endpoints::all_at(base))
        .with_default_backoff(Duration::ZERO)
        .with_form_submit_delay(Duration::ZERO)
        .with_max_retries(2)
}

/// Context for `settings`.
pub fn context(settings: ResolverSettings) -> FetchContext {
    FetchContext::with_settings(settings).expect("http client")
}

/// Drains a resolved body.
pub async fn collect_body(stream: ResolvedStream) -> Vec<u8> {
    let mut body = stream.body;
    let mut out = Vec::new();
    while let Some(chunk) = body.next().await {
        out.extend_from_slice(&chunk.expect("body chunk"));
    }
    out
}
