//! Categories, static pages and the author profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named grouping for entries. `name` is a normalized slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Static page addressed by a unique url slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// The single author of the diary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub bio: Option<String>,
}
