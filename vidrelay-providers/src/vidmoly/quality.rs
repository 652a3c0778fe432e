//! Quality selection over lookup results.

use super::api::VideoSource;

/// Numeric rank of a label like `1080p`. Unparseable labels rank 0.
pub fn quality_rank(label: Option<&str>) -> u32 {
    let Some(label) = label else {
        return 0;
    };
    let digits: String = label
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Picks the highest-quality source that carries a URL.
///
/// Ties keep lookup order, so the first of equal-ranked sources wins.
pub fn select_best(sources: &[VideoSource]) -> Option<&VideoSource> {
    let mut ranked: Vec<&VideoSource> = sources
        .iter()
        .filter(|s| s.url.as_deref().is_some_and(|u| !u.is_empty()))
        .collect();
    ranked.sort_by_key(|s| std::cmp::Reverse(quality_rank(s.quality.as_deref())));
    ranked.into_iter().next()
}
