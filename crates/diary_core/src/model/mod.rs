//! Domain model for the diary.
//!
//! # Responsibility
//! - Define the canonical records the repository persists and the
//!   navigation/feed layers read.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId` and a unique permalink.
//! - Derived content fields never drift from `content` (see `EntryBody`).
//! - Entries are totally ordered by `(publish_time, id)`.

pub mod catalog;
pub mod entry;
