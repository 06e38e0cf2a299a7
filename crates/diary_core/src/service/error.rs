//! Service-level error type.

use crate::feed::FeedError;
use crate::model::entry::EntryId;
use crate::nav::{InvalidRange, PageError, UnknownDirection};
use crate::repo::content_repo::RepoError;
use thiserror::Error;

pub type DiaryResult<T> = Result<T, DiaryError>;

#[derive(Debug, Error)]
pub enum DiaryError {
    /// Pagination bounds were rejected before any query ran.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
    /// Permalink, category name or page url collision.
    #[error("{field} `{value}` already exists")]
    NotUnique { field: &'static str, value: String },
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),
    /// Input normalizes to an empty slug.
    #[error("`{0}` does not contain any URL-safe characters")]
    InvalidSlug(String),
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error(transparent)]
    InvalidDirection(#[from] UnknownDirection),
    #[error("author profile is not configured")]
    ProfileMissing,
    #[error(transparent)]
    Repo(RepoError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// Write succeeded but read-back disagrees.
    #[error("inconsistent state: {0}")]
    InconsistentState(&'static str),
}

impl From<RepoError> for DiaryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotUnique { field, value } => Self::NotUnique { field, value },
            RepoError::NotFound(id) => Self::EntryNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PageError<RepoError>> for DiaryError {
    fn from(value: PageError<RepoError>) -> Self {
        match value {
            PageError::InvalidRange(range) => Self::InvalidRange(range),
            PageError::Source(err) => err.into(),
        }
    }
}
