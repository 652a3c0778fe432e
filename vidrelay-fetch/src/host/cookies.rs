//! Per-resolution cookie jar.
//!
//! Upstream hosts set session cookies on the interstitial page that must be
//! echoed on the confirmation submit. The jar lives for a single resolution
//! call and is never shared between requests.

use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use tracing::trace;

/// Ordered name/value cookie store.
///
/// Merge rule: the last write for a name wins, but the name keeps the
/// position of its first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a cookie, replacing any existing value for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Looks up a cookie value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Merges every `Set-Cookie` header from an upstream response.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                self.absorb_set_cookie(raw);
            }
        }
    }

    /// Merges one raw `Set-Cookie` value. Attributes after the first `;`
    /// are ignored; malformed pairs are skipped.
    pub fn absorb_set_cookie(&mut self, raw: &str) {
        let pair = raw.split(';').next().unwrap_or_default();
        let Some((name, value)) = pair.split_once('=') else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        trace!(cookie = name, "Cookie stored");
        self.set(name, value.trim());
    }

    /// Renders the jar as a `Cookie` request header value.
    pub fn header_value(&self) -> Option<HeaderValue> {
        if self.entries.is_empty() {
            return None;
        }
        let joined = self
            .entries
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }

    /// Number of cookies held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no cookie has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
