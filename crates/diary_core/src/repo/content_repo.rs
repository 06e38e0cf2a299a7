//! Content repository contract.

use crate::db::DbError;
use crate::model::catalog::{Category, Page, Profile};
use crate::model::entry::{Entry, EntryId, EntryStatus, EntryValidationError, OrderKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] EntryValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("entry not found: {0}")]
    NotFound(EntryId),
    #[error("{field} `{value}` already exists")]
    NotUnique { field: &'static str, value: String },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("content repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Direction of the canonical `(publish_time, id)` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// `publish_time DESC, id DESC`.
    #[default]
    NewestFirst,
    /// `publish_time ASC, id ASC`.
    OldestFirst,
}

impl SortOrder {
    pub fn reverse(self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }
}

/// Which neighbor of an anchor to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toward {
    /// Greatest key strictly less than the anchor.
    Older,
    /// Least key strictly greater than the anchor.
    Newer,
}

/// Row filter shared by ordered reads and counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Exact (normalized) category name.
    pub category: Option<String>,
    pub status: Option<EntryStatus>,
}

impl EntryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Storage contract for entries, categories, pages and the profile.
///
/// Reads are snapshots at call time; no cross-call consistency is promised.
pub trait ContentRepository {
    /// Inserts a new entry, creating any category it names that does not
    /// exist yet. Fails with `NotUnique` on permalink collision, in which
    /// case nothing is written.
    fn insert_entry(&self, entry: &Entry) -> RepoResult<EntryId>;
    /// Replaces every mutable field of an existing entry, including its
    /// category and tag sets, in one transaction. Missing categories are
    /// created in the same transaction.
    fn update_entry(&self, entry: &Entry) -> RepoResult<()>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    fn find_entry_by_permalink(&self, permalink: &str) -> RepoResult<Option<Entry>>;
    /// Returns up to `limit` entries matching `filter`, skipping `offset`
    /// rows of the requested order.
    fn ordered_entries(
        &self,
        filter: &EntryFilter,
        order: SortOrder,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<Entry>>;
    fn count_entries(&self, filter: &EntryFilter) -> RepoResult<u64>;
    /// Resolves the immediate neighbor of `anchor` in the canonical order.
    fn adjacent_entry(&self, anchor: &OrderKey, toward: Toward) -> RepoResult<Option<Entry>>;

    /// Inserts a category. Fails with `NotUnique` on name collision.
    fn insert_category(&self, name: &str) -> RepoResult<Category>;
    /// Returns the existing category or creates it, race-free.
    fn upsert_category(&self, name: &str) -> RepoResult<Category>;
    fn find_category(&self, name: &str) -> RepoResult<Option<Category>>;
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn count_categories(&self) -> RepoResult<u64>;

    /// Inserts a page. Fails with `NotUnique` on url collision.
    fn insert_page(&self, page: &Page) -> RepoResult<()>;
    fn find_page(&self, url: &str) -> RepoResult<Option<Page>>;
    fn list_pages(&self) -> RepoResult<Vec<Page>>;

    /// Returns the single author profile, if configured.
    fn get_profile(&self) -> RepoResult<Option<Profile>>;
    /// Creates or replaces the single author profile.
    fn put_profile(&self, profile: &Profile) -> RepoResult<()>;
}
