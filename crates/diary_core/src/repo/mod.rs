//! Content repository abstraction and SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract the navigation, pagination and feed layers
//!   consume (`ContentRepository`).
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repository writes call `Entry::validate()` before SQL mutations.
//! - Uniqueness collisions surface as `RepoError::NotUnique`, never as an
//!   overwrite.
//! - Ordered reads use `(publish_time, uuid)` as a total order.

pub mod content_repo;
pub mod sqlite_repo;
