//! Confirmation page parsing.
//!
//! Drive answers large or unscanned downloads with an HTML page holding a
//! form that must be submitted with a hidden `confirm` value. Markup changes
//! upstream only need a new [`InterstitialParser`].

use regex::Regex;
use std::sync::LazyLock;

static FORM_ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<form[^>]*action="([^"]*)""#).expect("Invalid regex"));

static CONFIRM_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)name="confirm"[^>]*value="([^"]*)""#).expect("Invalid regex")
});

static CONFIRM_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"confirm=([0-9A-Za-z_-]+)").expect("Invalid regex"));

/// The download form found on a confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterstitialForm {
    /// Form `action`, possibly relative.
    pub action: String,
    /// Hidden `confirm` value.
    pub confirm: String,
}

/// Extracts what is needed to get past a confirmation page.
pub trait InterstitialParser: Send + Sync {
    /// Finds the download form. Both the action and the confirm value must
    /// be present.
    fn parse_form(&self, html: &str) -> Option<InterstitialForm>;

    /// Finds a `confirm=` token in a URL or page.
    fn confirm_token(&self, text: &str) -> Option<String>;
}

/// Pattern-matching parser for the current Drive markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexInterstitialParser;

impl InterstitialParser for RegexInterstitialParser {
    fn parse_form(&self, html: &str) -> Option<InterstitialForm> {
        let action = FORM_ACTION_RE.captures(html)?.get(1)?.as_str();
        let confirm = CONFIRM_INPUT_RE.captures(html)?.get(1)?.as_str();
        Some(InterstitialForm {
            action: action.replace("&amp;", "&"),
            confirm: confirm.to_string(),
        })
    }

    fn confirm_token(&self, text: &str) -> Option<String> {
        CONFIRM_TOKEN_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}
