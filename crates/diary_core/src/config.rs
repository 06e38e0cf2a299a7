//! Site configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty or
//! missing file yields a usable configuration:
//!
//! ```toml
//! [site]
//! title = "My Diary"
//! url = "http://localhost:5000"
//! description = "A personal diary"
//!
//! [listing]
//! order = "newest_first"   # canonical order: newest_first | oldest_first
//! page_size = 10
//!
//! [summary]
//! policy = "always"        # always | when_truncated
//!
//! [feed]
//! size = 10
//! published_only = true
//! ```

use crate::feed::ChannelMeta;
use crate::repo::content_repo::SortOrder;
use crate::text::SummaryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    /// Base url used to build entry links in feeds.
    pub url: String,
    pub description: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "My Diary".to_string(),
            url: "http://localhost:5000".to_string(),
            description: "A personal diary".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSection {
    /// Canonical order for lists and first/last resolution.
    pub order: SortOrder,
    /// Window size used when a list request omits `end`.
    pub page_size: u32,
}

impl Default for ListingSection {
    fn default() -> Self {
        Self {
            order: SortOrder::NewestFirst,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySection {
    pub policy: SummaryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Number of most recent entries in the feed.
    pub size: u32,
    /// Drop drafts from the feed.
    pub published_only: bool,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            size: 10,
            published_only: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub listing: ListingSection,
    pub summary: SummarySection,
    pub feed: FeedSection,
}

impl SiteConfig {
    /// Loads and validates a config file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Invalid("site.title must not be empty".to_string()));
        }
        if self.site.url.trim().is_empty() {
            return Err(ConfigError::Invalid("site.url must not be empty".to_string()));
        }
        if self.listing.page_size == 0 {
            return Err(ConfigError::Invalid(
                "listing.page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Channel metadata for feed serialization.
    pub fn channel(&self) -> ChannelMeta {
        ChannelMeta {
            title: self.site.title.clone(),
            link: self.site.url.clone(),
            description: self.site.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.listing.order, SortOrder::NewestFirst);
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(config.summary.policy, SummaryPolicy::Always);
        assert!(config.feed.published_only);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = SiteConfig::from_toml_str(
            r#"
            [site]
            url = "https://diary.example"

            [listing]
            order = "oldest_first"

            [summary]
            policy = "when_truncated"
            "#,
        )
        .unwrap();
        assert_eq!(config.site.url, "https://diary.example");
        assert_eq!(config.site.title, "My Diary");
        assert_eq!(config.listing.order, SortOrder::OldestFirst);
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(config.summary.policy, SummaryPolicy::WhenTruncated);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = SiteConfig::from_toml_str("[listing]\npage_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("page_size")));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = SiteConfig::from_toml_str("[summary]\npolicy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults_and_present_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(SiteConfig::load(&missing).unwrap(), SiteConfig::default());

        let present = dir.path().join("site.toml");
        std::fs::write(&present, "[feed]\nsize = 3\npublished_only = false\n").unwrap();
        let config = SiteConfig::load(&present).unwrap();
        assert_eq!(config.feed.size, 3);
        assert!(!config.feed.published_only);
    }
}
