//! Ordered-content navigation.
//!
//! # Responsibility
//! - Window an ordered source into pages with boundary flags, without a
//!   separate count query (`pagination`).
//! - Resolve per-entry predecessor/successor and first/last status
//!   (`adjacency`).
//!
//! # Invariants
//! - Both layers are read-only and operate on a snapshot at call time.
//! - Page flags and per-entry flags are independent of each other.

pub mod adjacency;
pub mod pagination;

pub use adjacency::{Direction, EntryNavigation, Navigator, UnknownDirection};
pub use pagination::{page, InvalidRange, OrderedSource, PageError, PageRange, PageWindow};
