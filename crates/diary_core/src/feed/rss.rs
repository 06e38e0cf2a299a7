//! RSS 2.0 projection and XML writer.

use crate::model::entry::{Entry, EntryId};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io;
use thiserror::Error;

/// Literal path segment for entry links: `<site>/diary/<id>/<title>`.
pub const ENTRY_PATH_SEGMENT: &str = "diary";
const GENERATOR: &str = concat!("diary_core ", env!("CARGO_PKG_VERSION"));
const RSS_DOCS_URL: &str = "https://www.rssboard.org/rss-specification";
const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to write feed XML: {0}")]
    Write(#[from] io::Error),
    #[error("feed XML is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("entry {id} has publish_time {publish_time} outside the date range")]
    PublishTimeOutOfRange { id: EntryId, publish_time: i64 },
}

/// Channel-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Rendered HTML of the entry.
    pub description: String,
    /// Same value as `link`.
    pub guid: String,
    pub pub_date: DateTime<Utc>,
}

/// A fully built feed, ready to be written as XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssFeed {
    pub channel: ChannelMeta,
    pub last_build_date: DateTime<Utc>,
    pub items: Vec<FeedItem>,
}

/// Builds the public link of an entry.
///
/// A trailing `/` on `site_url` is dropped; the title is appended verbatim.
pub fn entry_link(site_url: &str, entry: &Entry) -> String {
    format!(
        "{}/{ENTRY_PATH_SEGMENT}/{}/{}",
        site_url.trim_end_matches('/'),
        entry.id,
        entry.title
    )
}

/// Projects `entries` (already ordered and limited) into a feed.
///
/// Fails with `PublishTimeOutOfRange` when an entry's timestamp has no
/// calendar date; no item is ever dated by a fallback.
pub fn serialize(
    channel: &ChannelMeta,
    entries: &[Entry],
    now: DateTime<Utc>,
) -> Result<RssFeed, FeedError> {
    let items = entries
        .iter()
        .map(|entry| {
            let pub_date = DateTime::from_timestamp_millis(entry.publish_time).ok_or(
                FeedError::PublishTimeOutOfRange {
                    id: entry.id,
                    publish_time: entry.publish_time,
                },
            )?;
            let link = entry_link(&channel.link, entry);
            Ok(FeedItem {
                title: entry.title.clone(),
                guid: link.clone(),
                link,
                description: entry.body.rendered_content().to_string(),
                pub_date,
            })
        })
        .collect::<Result<Vec<_>, FeedError>>()?;

    Ok(RssFeed {
        channel: channel.clone(),
        last_build_date: now,
        items,
    })
}

impl RssFeed {
    /// Writes the feed as a UTF-8 RSS 2.0 document.
    pub fn to_xml(&self) -> Result<String, FeedError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        write_text_element(&mut writer, "title", &self.channel.title)?;
        write_text_element(&mut writer, "link", &self.channel.link)?;
        write_text_element(&mut writer, "description", &self.channel.description)?;
        write_text_element(
            &mut writer,
            "lastBuildDate",
            &rfc822(&self.last_build_date),
        )?;
        write_text_element(&mut writer, "generator", GENERATOR)?;
        write_text_element(&mut writer, "docs", RSS_DOCS_URL)?;

        for item in &self.items {
            writer.write_event(Event::Start(BytesStart::new("item")))?;
            write_text_element(&mut writer, "title", &item.title)?;
            write_text_element(&mut writer, "link", &item.link)?;
            write_text_element(&mut writer, "description", &item.description)?;

            let mut guid = BytesStart::new("guid");
            guid.push_attribute(("isPermaLink", "true"));
            writer.write_event(Event::Start(guid))?;
            writer.write_event(Event::Text(BytesText::new(&item.guid)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            write_text_element(&mut writer, "pubDate", &rfc822(&item.pub_date))?;
            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn rfc822(date: &DateTime<Utc>) -> String {
    date.format(RFC822_FORMAT).to_string()
}
