//! Category, page and profile use-case service.
//!
//! # Invariants
//! - Category names and page urls are slug-normalized before storage and
//!   before lookup, so lookups accept the same free text as writes.
//! - A name/url collision is reported as `NotUnique`, never overwritten.
//! - There is at most one profile; `set_profile` replaces it.

use crate::model::catalog::{Category, Page, Profile};
use crate::repo::content_repo::{ContentRepository, EntryFilter};
use crate::service::error::{DiaryError, DiaryResult};
use crate::text::normalize_slug;
use chrono::Utc;
use log::info;
use uuid::Uuid;

pub struct CatalogService<R: ContentRepository> {
    repo: R,
}

impl<R: ContentRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a category. Fails with `NotUnique` if the normalized name exists.
    pub fn add_category(&self, name: &str) -> DiaryResult<Category> {
        let normalized = require_slug(name)?;
        let category = self.repo.insert_category(&normalized)?;
        info!(
            "event=category_add module=service status=ok category_id={}",
            category.id
        );
        Ok(category)
    }

    /// Returns the category with this name, creating it when absent.
    pub fn ensure_category(&self, name: &str) -> DiaryResult<Category> {
        let normalized = require_slug(name)?;
        Ok(self.repo.upsert_category(&normalized)?)
    }

    pub fn get_category(&self, name: &str) -> DiaryResult<Option<Category>> {
        Ok(self.repo.find_category(&normalize_slug(name))?)
    }

    /// All categories, by name.
    pub fn list_categories(&self) -> DiaryResult<Vec<Category>> {
        Ok(self.repo.list_categories()?)
    }

    pub fn category_count(&self) -> DiaryResult<u64> {
        Ok(self.repo.count_categories()?)
    }

    /// Number of entries filed under `name`.
    pub fn category_entry_count(&self, name: &str) -> DiaryResult<u64> {
        Ok(self
            .repo
            .count_entries(&EntryFilter::in_category(normalize_slug(name)))?)
    }

    /// Creates a static page under a unique url slug.
    pub fn create_page(&self, url: &str, title: &str, content: &str) -> DiaryResult<Page> {
        let page = Page {
            id: Uuid::new_v4(),
            url: require_slug(url)?,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };
        self.repo.insert_page(&page)?;
        info!("event=page_create module=service status=ok page_id={}", page.id);
        Ok(page)
    }

    pub fn get_page(&self, url: &str) -> DiaryResult<Option<Page>> {
        Ok(self.repo.find_page(&normalize_slug(url))?)
    }

    /// All pages, newest first.
    pub fn list_pages(&self) -> DiaryResult<Vec<Page>> {
        Ok(self.repo.list_pages()?)
    }

    pub fn get_profile(&self) -> DiaryResult<Option<Profile>> {
        Ok(self.repo.get_profile()?)
    }

    /// Creates or replaces the single author profile.
    pub fn set_profile(&self, name: &str, bio: Option<&str>) -> DiaryResult<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DiaryError::BlankField("profile name"));
        }
        let profile = Profile {
            name: name.to_string(),
            bio: bio.map(str::to_string),
        };
        self.repo.put_profile(&profile)?;
        info!("event=profile_set module=service status=ok");
        Ok(profile)
    }
}

fn require_slug(text: &str) -> DiaryResult<String> {
    let slug = normalize_slug(text);
    if slug.is_empty() {
        Err(DiaryError::InvalidSlug(text.to_string()))
    } else {
        Ok(slug)
    }
}
