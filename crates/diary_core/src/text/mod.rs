//! Text normalization and content derivation.
//!
//! # Responsibility
//! - Turn free text into URL-safe identifiers (permalinks, category names,
//!   page urls) and normalized tag values.
//! - Derive rendered markup, plain text and summary from author markdown.
//!
//! # Invariants
//! - Every function here is total: arbitrary input never produces an error.
//! - Output is a pure function of input (no clock, no randomness).

pub mod slug;
pub mod transform;

pub use slug::{normalize_slug, normalize_tag, normalize_tags};
pub use transform::{
    render_markdown, strip_markup, summarize, transform, SummaryPolicy, Transformed,
    SUMMARY_CHAR_LIMIT, SUMMARY_MARKER,
};
