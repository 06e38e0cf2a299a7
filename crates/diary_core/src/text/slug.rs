//! URL-safe identifier and tag normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static UNSAFE_SLUG_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid slug regex"));

/// Converts free text into a URL-safe slug.
///
/// Rules, applied in order:
/// - path separators (`/`, `\`) become spaces;
/// - whitespace runs collapse into a single `_`;
/// - every character outside `[A-Za-z0-9_.-]` is dropped;
/// - leading/trailing `.` and `_` are trimmed.
///
/// The result may be empty (e.g. input made only of non-ASCII letters);
/// callers that need a non-empty identifier must reject that case.
pub fn normalize_slug(text: &str) -> String {
    let spaced = text.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_SLUG_CHARS_RE.replace_all(&joined, "");
    cleaned.trim_matches(['.', '_']).to_string()
}

/// Normalizes one tag value: trimmed and lowercased, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
