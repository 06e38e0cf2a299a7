use chrono::{TimeZone, Utc};
use diary_core::db::open_db_in_memory;
use diary_core::{
    CatalogService, DiaryService, EntryDraft, EntryStatus, SiteConfig, SqliteContentRepository,
};
use rusqlite::Connection;

fn diary(conn: &Connection, config: SiteConfig) -> DiaryService<SqliteContentRepository<'_>> {
    CatalogService::new(SqliteContentRepository::try_new(conn).unwrap())
        .set_profile("Ada", None)
        .unwrap();
    DiaryService::new(SqliteContentRepository::try_new(conn).unwrap(), config)
}

fn site_config() -> SiteConfig {
    SiteConfig::from_toml_str(
        r#"
[site]
title = "Field Notes"
url = "https://notes.example/"
description = "Days & nights"
"#,
    )
    .unwrap()
}

fn item_count(xml: &str) -> usize {
    xml.matches("<item>").count()
}

#[test]
fn feed_lists_newest_entries_first_with_channel_metadata() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, site_config());
    let older = service
        .create_entry(
            EntryDraft::new("older", "Older", "first *post*").published_at(1_700_000_000_000),
        )
        .unwrap();
    service
        .create_entry(
            EntryDraft::new("newer", "Newer", "second post").published_at(1_700_000_100_000),
        )
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let xml = service.rss_feed_at(10, now).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<rss version=\"2.0\">"));
    assert!(xml.contains("<title>Field Notes</title>"));
    assert!(xml.contains("<link>https://notes.example/</link>"));
    assert!(xml.contains("<description>Days &amp; nights</description>"));
    assert!(xml.contains("<lastBuildDate>Tue, 02 Jan 2024 03:04:05 GMT</lastBuildDate>"));
    assert!(xml.contains("<pubDate>Tue, 14 Nov 2023 22:13:20 GMT</pubDate>"));
    assert!(xml.contains(&format!(
        "<guid isPermaLink=\"true\">https://notes.example/diary/{}/Older</guid>",
        older.id
    )));
    assert!(xml.contains("&lt;em&gt;post&lt;/em&gt;"));

    assert_eq!(item_count(&xml), 2);
    let newer_at = xml.find("<title>Newer</title>").unwrap();
    let older_at = xml.find("<title>Older</title>").unwrap();
    assert!(newer_at < older_at);
}

#[test]
fn feed_respects_requested_size() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, site_config());
    for time in 1..=5 {
        service
            .create_entry(
                EntryDraft::new(format!("p{time}"), format!("P{time}"), "x").published_at(time),
            )
            .unwrap();
    }

    let xml = service.rss_feed(3).unwrap();
    assert_eq!(item_count(&xml), 3);
    assert!(xml.contains("<title>P5</title>"));
    assert!(!xml.contains("<title>P2</title>"));
}

#[test]
fn drafts_are_left_out_unless_configured() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, site_config());
    service
        .create_entry(EntryDraft::new("live", "Live", "x").published_at(1))
        .unwrap();
    service
        .create_entry(
            EntryDraft::new("hidden", "Hidden", "x")
                .with_status(EntryStatus::Draft)
                .published_at(2),
        )
        .unwrap();

    let xml = service.rss_feed(10).unwrap();
    assert_eq!(item_count(&xml), 1);
    assert!(!xml.contains("Hidden"));

    let mut config = site_config();
    config.feed.published_only = false;
    let everything = DiaryService::new(SqliteContentRepository::try_new(&conn).unwrap(), config);
    assert_eq!(item_count(&everything.rss_feed(10).unwrap()), 2);
}

#[test]
fn empty_store_still_produces_a_channel() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, site_config());

    let xml = service.rss_feed(10).unwrap();
    assert!(xml.contains("<channel>"));
    assert!(xml.contains("<generator>"));
    assert_eq!(item_count(&xml), 0);
}
