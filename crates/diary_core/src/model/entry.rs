//! Diary entry model.
//!
//! # Invariants
//! - `permalink` is a non-empty, already-normalized slug.
//! - `EntryBody` derived fields are only ever computed together from
//!   `content`; there is no setter for a single derived field.
//! - `OrderKey` is the sole ordering key; ties on `publish_time` are broken
//!   by `id`.

use crate::text::{normalize_slug, transform, SummaryPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of one diary entry.
pub type EntryId = Uuid;

/// Publication state of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Published,
    Draft,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = EntryValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            _ => Err(EntryValidationError::UnknownStatus(value.to_string())),
        }
    }
}

/// Validation failures for entry write paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryValidationError {
    #[error("permalink must not be empty")]
    EmptyPermalink,
    #[error("permalink `{0}` is not a normalized slug")]
    UnnormalizedPermalink(String),
    #[error("title must not be blank")]
    BlankTitle,
    #[error("unknown entry status `{0}`")]
    UnknownStatus(String),
    #[error("publish_time must not be negative, got {0}")]
    NegativePublishTime(i64),
    #[error("publish_time {0} is beyond the representable date range")]
    PublishTimeOutOfRange(i64),
}

/// Author markdown plus the fields derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBody {
    content: String,
    rendered_content: String,
    plain_text: String,
    summary: String,
}

impl EntryBody {
    /// Builds a body by running the transform pipeline over `content`.
    pub fn from_markup(content: impl Into<String>, policy: SummaryPolicy) -> Self {
        let content = content.into();
        let derived = transform(&content, policy);
        Self {
            content,
            rendered_content: derived.rendered,
            plain_text: derived.plain_text,
            summary: derived.summary,
        }
    }

    /// Rebuilds a body from persisted columns. Only the repository read path
    /// uses this; it trusts that the row was written via `from_markup`.
    pub(crate) fn from_persisted(
        content: String,
        rendered_content: String,
        plain_text: String,
        summary: String,
    ) -> Self {
        Self {
            content,
            rendered_content,
            plain_text,
            summary,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rendered_content(&self) -> &str {
        &self.rendered_content
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Position of an entry in the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderKey {
    pub publish_time: i64,
    pub id: EntryId,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.publish_time
            .cmp(&other.publish_time)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One diary post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub permalink: String,
    pub title: String,
    #[serde(flatten)]
    pub body: EntryBody,
    /// Category names (normalized slugs), sorted.
    pub categories: Vec<String>,
    /// Lowercased tags, sorted.
    pub tags: Vec<String>,
    pub status: EntryStatus,
    /// Name of the single author profile at write time.
    pub author: String,
    /// Unix epoch milliseconds; set once at creation.
    pub publish_time: i64,
}

impl Entry {
    /// Creates a new published entry with a generated id.
    pub fn new(
        permalink: impl Into<String>,
        title: impl Into<String>,
        body: EntryBody,
        author: impl Into<String>,
        publish_time: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            permalink: permalink.into(),
            title: title.into(),
            body,
            categories: Vec::new(),
            tags: Vec::new(),
            status: EntryStatus::Published,
            author: author.into(),
            publish_time,
        }
    }

    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            publish_time: self.publish_time,
            id: self.id,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == EntryStatus::Published
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.permalink.is_empty() {
            return Err(EntryValidationError::EmptyPermalink);
        }
        if normalize_slug(&self.permalink) != self.permalink {
            return Err(EntryValidationError::UnnormalizedPermalink(
                self.permalink.clone(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::BlankTitle);
        }
        if self.publish_time < 0 {
            return Err(EntryValidationError::NegativePublishTime(self.publish_time));
        }
        if DateTime::<Utc>::from_timestamp_millis(self.publish_time).is_none() {
            return Err(EntryValidationError::PublishTimeOutOfRange(
                self.publish_time,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(publish_time: i64) -> Entry {
        Entry::new(
            "hello",
            "Hello",
            EntryBody::from_markup("**hello**", SummaryPolicy::Always),
            "author",
            publish_time,
        )
    }

    #[test]
    fn body_derives_all_fields_from_markup() {
        let body = EntryBody::from_markup("# Hi\n\nthere", SummaryPolicy::WhenTruncated);
        assert_eq!(body.content(), "# Hi\n\nthere");
        assert!(body.rendered_content().contains("<h1>Hi</h1>"));
        assert_eq!(body.plain_text(), "Hi\nthere");
        assert_eq!(body.summary(), "Hi\nthere");
    }

    #[test]
    fn order_key_breaks_ties_by_id() {
        let mut a = sample(10);
        let mut b = sample(10);
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);
        assert!(a.order_key() < b.order_key());
        assert!(sample(9).order_key() < a.order_key());
    }

    #[test]
    fn validate_rejects_unnormalized_permalink_and_blank_title() {
        let mut entry = sample(1);
        entry.permalink = "has space".to_string();
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::UnnormalizedPermalink("has space".to_string()))
        );

        let mut entry = sample(1);
        entry.title = "  ".to_string();
        assert_eq!(entry.validate(), Err(EntryValidationError::BlankTitle));
    }

    #[test]
    fn validate_rejects_publish_times_without_a_calendar_date() {
        assert_eq!(
            sample(-1).validate(),
            Err(EntryValidationError::NegativePublishTime(-1))
        );
        assert_eq!(
            sample(i64::MAX).validate(),
            Err(EntryValidationError::PublishTimeOutOfRange(i64::MAX))
        );
        assert_eq!(sample(1_700_000_000_000).validate(), Ok(()));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Draft".parse::<EntryStatus>(), Ok(EntryStatus::Draft));
        assert!("archived".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn entry_serializes_with_flat_body_fields() {
        let entry = sample(1);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["permalink"], "hello");
        assert_eq!(json["plain_text"], "hello");
        assert_eq!(json["summary"], "hello...");
        assert_eq!(json["status"], "published");
    }
}
