//! Diary entry use-case service.
//!
//! # Responsibility
//! - Entry reads, with and without per-entry navigation flags.
//! - Windowed entry lists, globally or per category.
//! - Entry writes that keep derived content fields in sync with markdown.
//! - RSS feed generation.
//!
//! # Invariants
//! - Every write recomputes rendered/plain/summary fields from `content`.
//! - Permalinks and category references are slug-normalized before storage.
//! - Saving by permalink keeps the existing id and publish time.

use crate::config::SiteConfig;
use crate::feed;
use crate::model::entry::{Entry, EntryBody, EntryId, EntryStatus};
use crate::nav::{page, Direction, EntryNavigation, Navigator, OrderedSource, PageWindow};
use crate::repo::content_repo::{ContentRepository, EntryFilter, RepoError, SortOrder};
use crate::service::error::{DiaryError, DiaryResult};
use crate::text::{normalize_slug, normalize_tags};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Author input for creating or editing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Free text; normalized to a slug before use.
    pub permalink: String,
    pub title: String,
    /// Markdown source.
    pub content: String,
    /// Free-text category names; normalized to slugs before use.
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub status: EntryStatus,
    /// Epoch milliseconds for new entries; `None` means "now". Ignored when
    /// an existing entry is edited.
    pub publish_time: Option<i64>,
}

impl EntryDraft {
    pub fn new(
        permalink: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            permalink: permalink.into(),
            title: title.into(),
            content: content.into(),
            categories: Vec::new(),
            tags: Vec::new(),
            status: EntryStatus::Published,
            publish_time: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn published_at(mut self, publish_time: i64) -> Self {
        self.publish_time = Some(publish_time);
        self
    }
}

/// List window request. Omitted fields fall back to `[listing]` config:
/// `start = 0`, `end = start + page_size`, `order = listing.order`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub order: Option<SortOrder>,
}

impl ListRequest {
    pub fn window(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            order: None,
        }
    }

    pub fn ordered(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

struct RepoSource<'a, R: ?Sized> {
    repo: &'a R,
    filter: EntryFilter,
    order: SortOrder,
}

impl<R: ContentRepository + ?Sized> OrderedSource for RepoSource<'_, R> {
    type Item = Entry;
    type Error = RepoError;

    fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Entry>, RepoError> {
        self.repo
            .ordered_entries(&self.filter, self.order, offset, limit)
    }
}

/// Diary service facade over a content repository.
pub struct DiaryService<R: ContentRepository> {
    repo: R,
    config: SiteConfig,
}

impl<R: ContentRepository> DiaryService<R> {
    pub fn new(repo: R, config: SiteConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Gets one entry by id; `None` when absent.
    pub fn get_entry(&self, id: EntryId) -> DiaryResult<Option<Entry>> {
        Ok(self.repo.get_entry(id)?)
    }

    /// Gets one entry by permalink (normalized before lookup).
    pub fn get_entry_by_permalink(&self, permalink: &str) -> DiaryResult<Option<Entry>> {
        Ok(self
            .repo
            .find_entry_by_permalink(&normalize_slug(permalink))?)
    }

    /// Gets one entry with its older/newer flags.
    ///
    /// Fails with `EntryNotFound` when `id` does not exist.
    pub fn get_entry_with_navigation(&self, id: EntryId) -> DiaryResult<EntryNavigation> {
        let entry = self.require_entry(id)?;
        let navigation = self.navigator().with_navigation(entry)?;
        debug!(
            "event=entry_navigation module=service status=ok entry_id={} has_prev={} has_next={}",
            id, navigation.has_prev, navigation.has_next
        );
        Ok(navigation)
    }

    /// Resolves the neighbor of `id` named by `direction` (`prev`/`next`).
    ///
    /// Returns `Ok(None)` at either end of the order and `EntryNotFound`
    /// when the anchor itself does not exist.
    pub fn adjacent_entry(&self, direction: &str, id: EntryId) -> DiaryResult<Option<Entry>> {
        let direction: Direction = direction.parse()?;
        let anchor = self.require_entry(id)?;
        Ok(self.navigator().step(&anchor, direction)?)
    }

    /// Head of the canonical order.
    pub fn first_entry(&self) -> DiaryResult<Option<Entry>> {
        Ok(self.navigator().first()?)
    }

    /// Tail of the canonical order.
    pub fn last_entry(&self) -> DiaryResult<Option<Entry>> {
        Ok(self.navigator().last()?)
    }

    /// Lists one window of all entries.
    pub fn list_entries(&self, request: &ListRequest) -> DiaryResult<PageWindow<Entry>> {
        self.list_window(EntryFilter::all(), request)
    }

    /// Lists one window of entries filed under `category_name`.
    pub fn list_entries_by_category(
        &self,
        category_name: &str,
        request: &ListRequest,
    ) -> DiaryResult<PageWindow<Entry>> {
        self.list_window(
            EntryFilter::in_category(normalize_slug(category_name)),
            request,
        )
    }

    pub fn entry_count(&self) -> DiaryResult<u64> {
        Ok(self.repo.count_entries(&EntryFilter::all())?)
    }

    /// RSS document for the `size` most recent entries, built now.
    pub fn rss_feed(&self, size: u32) -> DiaryResult<String> {
        self.rss_feed_at(size, Utc::now())
    }

    /// RSS document for the `size` most recent entries with an explicit
    /// build time.
    pub fn rss_feed_at(&self, size: u32, now: DateTime<Utc>) -> DiaryResult<String> {
        let filter = if self.config.feed.published_only {
            EntryFilter::all().with_status(EntryStatus::Published)
        } else {
            EntryFilter::all()
        };
        let entries =
            self.repo
                .ordered_entries(&filter, SortOrder::NewestFirst, 0, u64::from(size))?;
        let xml = feed::serialize(&self.config.channel(), &entries, now)?.to_xml()?;
        info!(
            "event=rss_build module=service status=ok requested={} items={}",
            size,
            entries.len()
        );
        Ok(xml)
    }

    /// Creates a new entry. Fails with `NotUnique` when the normalized
    /// permalink is already taken.
    pub fn create_entry(&self, draft: EntryDraft) -> DiaryResult<Entry> {
        let prepared = self.prepare(draft)?;
        self.insert_prepared(prepared)
    }

    /// Creates or edits an entry addressed by permalink.
    ///
    /// An existing entry keeps its id and publish time; every other field is
    /// replaced. Concurrent saves of the same permalink are last-writer-wins.
    pub fn save_entry(&self, draft: EntryDraft) -> DiaryResult<Entry> {
        let prepared = self.prepare(draft)?;
        let Some(existing) = self.repo.find_entry_by_permalink(&prepared.permalink)? else {
            return self.insert_prepared(prepared);
        };

        let mut updated = prepared.into_entry(existing.publish_time);
        updated.id = existing.id;
        self.repo.update_entry(&updated)?;
        info!(
            "event=entry_save module=service status=ok mode=update entry_id={}",
            updated.id
        );
        self.read_back(updated.id, "updated entry not found in read-back")
    }

    /// Deletes an entry. Later navigation from its id reports `EntryNotFound`.
    pub fn delete_entry(&self, id: EntryId) -> DiaryResult<()> {
        self.repo.delete_entry(id)?;
        info!("event=entry_delete module=service status=ok entry_id={id}");
        Ok(())
    }

    fn list_window(
        &self,
        filter: EntryFilter,
        request: &ListRequest,
    ) -> DiaryResult<PageWindow<Entry>> {
        let start = request.start.unwrap_or(0);
        let end = request
            .end
            .unwrap_or_else(|| start.saturating_add(i64::from(self.config.listing.page_size)));
        let order = request.order.unwrap_or(self.config.listing.order);
        let has_category = filter.category.is_some();
        let source = RepoSource {
            repo: &self.repo,
            filter,
            order,
        };

        let window = page(&source, start, end).map_err(|err| {
            warn!(
                "event=entry_list module=service status=error start={start} end={end} error={err}"
            );
            DiaryError::from(err)
        })?;
        debug!(
            "event=entry_list module=service status=ok start={} end={} by_category={} items={} has_prev={} has_next={}",
            start,
            end,
            has_category,
            window.items.len(),
            window.has_prev,
            window.has_next
        );
        Ok(window)
    }

    fn navigator(&self) -> Navigator<'_, R> {
        Navigator::new(&self.repo, self.config.listing.order)
    }

    fn require_entry(&self, id: EntryId) -> DiaryResult<Entry> {
        self.repo
            .get_entry(id)?
            .ok_or(DiaryError::EntryNotFound(id))
    }

    fn read_back(&self, id: EntryId, details: &'static str) -> DiaryResult<Entry> {
        self.repo
            .get_entry(id)?
            .ok_or(DiaryError::InconsistentState(details))
    }

    fn prepare(&self, draft: EntryDraft) -> DiaryResult<PreparedEntry> {
        let permalink = normalize_slug(&draft.permalink);
        if permalink.is_empty() {
            return Err(DiaryError::InvalidSlug(draft.permalink));
        }

        let author = self
            .repo
            .get_profile()?
            .ok_or(DiaryError::ProfileMissing)?
            .name;

        let mut categories = BTreeSet::new();
        for raw in &draft.categories {
            let name = normalize_slug(raw);
            if name.is_empty() {
                return Err(DiaryError::InvalidSlug(raw.clone()));
            }
            categories.insert(name);
        }

        Ok(PreparedEntry {
            permalink,
            title: draft.title,
            body: EntryBody::from_markup(draft.content, self.config.summary.policy),
            categories: categories.into_iter().collect(),
            tags: normalize_tags(&draft.tags),
            status: draft.status,
            author,
            publish_time: draft.publish_time,
        })
    }

    fn insert_prepared(&self, prepared: PreparedEntry) -> DiaryResult<Entry> {
        let publish_time = prepared
            .publish_time
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let entry = prepared.into_entry(publish_time);
        let id = self.repo.insert_entry(&entry)?;
        info!("event=entry_save module=service status=ok mode=create entry_id={id}");
        self.read_back(id, "created entry not found in read-back")
    }
}

struct PreparedEntry {
    permalink: String,
    title: String,
    body: EntryBody,
    categories: Vec<String>,
    tags: Vec<String>,
    status: EntryStatus,
    author: String,
    publish_time: Option<i64>,
}

impl PreparedEntry {
    fn into_entry(self, publish_time: i64) -> Entry {
        let mut entry = Entry::new(
            self.permalink,
            self.title,
            self.body,
            self.author,
            publish_time,
        );
        entry.categories = self.categories;
        entry.tags = self.tags;
        entry.status = self.status;
        entry
    }
}
