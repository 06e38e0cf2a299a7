//! Markdown content transform pipeline.
//!
//! `transform` produces the three derived fields persisted next to an
//! entry's markdown: rendered HTML, plain text and a bounded summary.
//! The three values are always produced together from the same input.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Maximum number of plain-text code points kept in a summary.
pub const SUMMARY_CHAR_LIMIT: usize = 80;
/// Truncation marker appended to summaries.
pub const SUMMARY_MARKER: &str = "...";

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|apos|nbsp|#39|#x27);").expect("valid entity regex")
});

/// When the summary marker is appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPolicy {
    /// Marker is always appended, even when nothing was cut.
    #[default]
    Always,
    /// Marker is appended only when the plain text exceeds the limit.
    WhenTruncated,
}

/// Derived content fields for one markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub rendered: String,
    pub plain_text: String,
    pub summary: String,
}

/// Runs the full pipeline: markdown -> HTML -> plain text -> summary.
pub fn transform(raw_markup: &str, policy: SummaryPolicy) -> Transformed {
    let rendered = render_markdown(raw_markup);
    let plain_text = strip_markup(&rendered);
    let summary = summarize(&plain_text, policy);
    Transformed {
        rendered,
        plain_text,
        summary,
    }
}

/// Renders CommonMark (plus tables and strikethrough) to HTML.
///
/// Unrecognized syntax is emitted as escaped literal text.
pub fn render_markdown(raw_markup: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(raw_markup, options);
    let mut rendered = String::with_capacity(raw_markup.len() + raw_markup.len() / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

/// Removes all tags and comments from HTML and decodes the basic entities
/// the renderer emits. Text order and inner spacing are kept as-is; only
/// leading/trailing whitespace is trimmed.
pub fn strip_markup(rendered: &str) -> String {
    let without_tags = TAG_RE.replace_all(rendered, "");
    let decoded = ENTITY_RE.replace_all(&without_tags, |caps: &Captures<'_>| {
        match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "nbsp" => "\u{a0}",
            _ => "'",
        }
    });
    decoded.trim().to_string()
}

/// Cuts plain text to [`SUMMARY_CHAR_LIMIT`] code points and applies the
/// marker according to `policy`.
pub fn summarize(plain_text: &str, policy: SummaryPolicy) -> String {
    let mut chars = plain_text.chars();
    let mut summary: String = chars.by_ref().take(SUMMARY_CHAR_LIMIT).collect();
    let truncated = chars.next().is_some();
    if truncated || policy == SummaryPolicy::Always {
        summary.push_str(SUMMARY_MARKER);
    }
    summary
}
