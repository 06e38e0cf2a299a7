//! Core domain logic for a single-author diary.
//!
//! This crate owns the ordered-content rules: canonical entry order,
//! windowed pagination, per-entry adjacency, content derivation and RSS
//! serialization. Rendering and transport belong to callers.

pub mod config;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod nav;
pub mod repo;
pub mod service;
pub mod text;

pub use config::{ConfigError, SiteConfig};
pub use feed::{ChannelMeta, FeedError, FeedItem, RssFeed};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{Category, Page, Profile};
pub use model::entry::{Entry, EntryBody, EntryId, EntryStatus, EntryValidationError, OrderKey};
pub use nav::{Direction, EntryNavigation, InvalidRange, Navigator, PageWindow};
pub use repo::content_repo::{
    ContentRepository, EntryFilter, RepoError, RepoResult, SortOrder, Toward,
};
pub use repo::sqlite_repo::SqliteContentRepository;
pub use service::catalog_service::CatalogService;
pub use service::diary_service::{DiaryService, EntryDraft, ListRequest};
pub use service::error::{DiaryError, DiaryResult};
pub use text::SummaryPolicy;

/// Minimal health-check API for integration smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
