//! Per-entry adjacency over the canonical order.
//!
//! # Invariants
//! - "prev" always means chronologically older, "next" chronologically
//!   newer, whatever the canonical listing direction is.
//! - `first`/`last` follow the canonical direction; the older/newer flags
//!   are derived from them per direction instead of being hardcoded.
//! - Ties on `publish_time` are broken by entry id, so `previous(next(e))`
//!   is `e` whenever both sides exist.

use crate::model::entry::Entry;
use crate::repo::content_repo::{ContentRepository, EntryFilter, RepoResult, SortOrder, Toward};
use std::str::FromStr;
use thiserror::Error;

/// Named navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Chronologically older neighbor.
    Previous,
    /// Chronologically newer neighbor.
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown navigation direction `{0}`; expected prev|next")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prev" | "previous" | "older" => Ok(Self::Previous),
            "next" | "newer" => Ok(Self::Next),
            _ => Err(UnknownDirection(value.to_string())),
        }
    }
}

impl Direction {
    fn toward(self) -> Toward {
        match self {
            Self::Previous => Toward::Older,
            Self::Next => Toward::Newer,
        }
    }
}

/// An entry together with its "older"/"newer" link flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNavigation {
    /// An older entry exists.
    pub has_prev: bool,
    /// A newer entry exists.
    pub has_next: bool,
    pub entry: Entry,
}

/// Adjacency queries bound to one repository and canonical direction.
pub struct Navigator<'r, R: ?Sized> {
    repo: &'r R,
    canonical: SortOrder,
}

impl<'r, R: ContentRepository + ?Sized> Navigator<'r, R> {
    pub fn new(repo: &'r R, canonical: SortOrder) -> Self {
        Self { repo, canonical }
    }

    /// Head of the canonical order (the newest entry for `NewestFirst`).
    pub fn first(&self) -> RepoResult<Option<Entry>> {
        self.head(self.canonical)
    }

    /// Tail of the canonical order (the oldest entry for `NewestFirst`).
    pub fn last(&self) -> RepoResult<Option<Entry>> {
        self.head(self.canonical.reverse())
    }

    /// Greatest entry strictly older than `entry`.
    pub fn previous(&self, entry: &Entry) -> RepoResult<Option<Entry>> {
        self.step(entry, Direction::Previous)
    }

    /// Least entry strictly newer than `entry`.
    pub fn next(&self, entry: &Entry) -> RepoResult<Option<Entry>> {
        self.step(entry, Direction::Next)
    }

    pub fn step(&self, entry: &Entry, direction: Direction) -> RepoResult<Option<Entry>> {
        self.repo
            .adjacent_entry(&entry.order_key(), direction.toward())
    }

    /// Attaches older/newer flags to `entry`.
    ///
    /// `has_next` is false only for the newest entry and `has_prev` only for
    /// the oldest; a singleton set has both false.
    pub fn with_navigation(&self, entry: Entry) -> RepoResult<EntryNavigation> {
        let (newest, oldest) = match self.canonical {
            SortOrder::NewestFirst => (self.first()?, self.last()?),
            SortOrder::OldestFirst => (self.last()?, self.first()?),
        };
        let has_prev = oldest.is_some_and(|edge| edge.id != entry.id);
        let has_next = newest.is_some_and(|edge| edge.id != entry.id);

        Ok(EntryNavigation {
            has_prev,
            has_next,
            entry,
        })
    }

    fn head(&self, order: SortOrder) -> RepoResult<Option<Entry>> {
        Ok(self
            .repo
            .ordered_entries(&EntryFilter::all(), order, 0, 1)?
            .into_iter()
            .next())
    }
}
