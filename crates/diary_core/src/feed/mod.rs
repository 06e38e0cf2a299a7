//! Syndication feeds.
//!
//! # Responsibility
//! - Project recent entries into an RSS 2.0 document.
//!
//! # Invariants
//! - Item order equals input order; the serializer never re-sorts.
//! - Build time is an explicit argument, never read from the clock here.

pub mod rss;

pub use rss::{entry_link, serialize, ChannelMeta, FeedError, FeedItem, RssFeed};
