use diary_core::db::open_db_in_memory;
use diary_core::{
    CatalogService, DiaryError, DiaryService, Entry, EntryDraft, ListRequest, SiteConfig,
    SortOrder, SqliteContentRepository,
};
use rusqlite::Connection;

fn diary(conn: &Connection, config: SiteConfig) -> DiaryService<SqliteContentRepository<'_>> {
    CatalogService::new(SqliteContentRepository::try_new(conn).unwrap())
        .set_profile("Ada", None)
        .unwrap();
    DiaryService::new(SqliteContentRepository::try_new(conn).unwrap(), config)
}

fn seed(service: &DiaryService<SqliteContentRepository<'_>>, times: &[i64]) {
    for (index, time) in times.iter().enumerate() {
        service
            .create_entry(
                EntryDraft::new(format!("post-{index}"), format!("Post {time}"), "x")
                    .published_at(*time),
            )
            .unwrap();
    }
}

fn times(items: &[Entry]) -> Vec<i64> {
    items.iter().map(|entry| entry.publish_time).collect()
}

#[test]
fn middle_window_reports_both_neighbors() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    seed(&service, &[3, 1, 5, 2, 4]);

    let window = service.list_entries(&ListRequest::window(1, 3)).unwrap();

    assert_eq!(times(&window.items), vec![4, 3]);
    assert!(window.has_prev);
    assert!(window.has_next);
}

#[test]
fn first_and_last_windows_flag_their_edges() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    seed(&service, &[1, 2, 3, 4, 5]);

    let first = service.list_entries(&ListRequest::window(0, 2)).unwrap();
    assert_eq!(times(&first.items), vec![5, 4]);
    assert!(!first.has_prev);
    assert!(first.has_next);

    let last = service.list_entries(&ListRequest::window(3, 5)).unwrap();
    assert_eq!(times(&last.items), vec![2, 1]);
    assert!(last.has_prev);
    assert!(!last.has_next);

    let beyond = service.list_entries(&ListRequest::window(7, 9)).unwrap();
    assert!(beyond.items.is_empty());
    assert!(beyond.has_prev);
    assert!(!beyond.has_next);
}

#[test]
fn category_window_only_contains_filed_entries() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    service
        .create_entry(EntryDraft::new("a", "A", "x").with_categories(["travel"]).published_at(10))
        .unwrap();
    service
        .create_entry(EntryDraft::new("b", "B", "x").with_categories(["food"]).published_at(20))
        .unwrap();
    service
        .create_entry(
            EntryDraft::new("c", "C", "x")
                .with_categories(["travel", "food"])
                .published_at(30),
        )
        .unwrap();

    let window = service
        .list_entries_by_category("travel", &ListRequest::window(0, 10))
        .unwrap();

    assert_eq!(times(&window.items), vec![30, 10]);
    assert!(!window.has_prev);
    assert!(!window.has_next);

    let unknown = service
        .list_entries_by_category("nowhere", &ListRequest::window(0, 10))
        .unwrap();
    assert!(unknown.items.is_empty());
}

#[test]
fn invalid_windows_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    seed(&service, &[1, 2]);

    for (start, end) in [(3, 3), (4, 2), (-1, 2)] {
        let err = service
            .list_entries(&ListRequest::window(start, end))
            .unwrap_err();
        match err {
            DiaryError::InvalidRange(range) => {
                assert_eq!((range.start, range.end), (start, end));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn oldest_first_order_reverses_the_listing() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    seed(&service, &[1, 2, 3, 4, 5]);

    let window = service
        .list_entries(&ListRequest::window(0, 3).ordered(SortOrder::OldestFirst))
        .unwrap();

    assert_eq!(times(&window.items), vec![1, 2, 3]);
    assert!(!window.has_prev);
    assert!(window.has_next);
}

#[test]
fn default_request_uses_configured_page_size() {
    let conn = open_db_in_memory().unwrap();
    let mut config = SiteConfig::default();
    config.listing.page_size = 2;
    let service = diary(&conn, config);
    seed(&service, &[1, 2, 3]);

    let window = service.list_entries(&ListRequest::default()).unwrap();

    assert_eq!(times(&window.items), vec![3, 2]);
    assert!(!window.has_prev);
    assert!(window.has_next);
}

#[test]
fn tied_publish_times_page_without_gaps_or_repeats() {
    let conn = open_db_in_memory().unwrap();
    let service = diary(&conn, SiteConfig::default());
    seed(&service, &[7, 7, 7, 7, 7]);

    let mut seen = Vec::new();
    for start in (0..6).step_by(2) {
        let window = service
            .list_entries(&ListRequest::window(start, start + 2))
            .unwrap();
        seen.extend(window.items.into_iter().map(|entry| entry.id));
    }

    let mut all = service
        .list_entries(&ListRequest::window(0, 10))
        .unwrap()
        .items
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    assert_eq!(seen, all);
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 5);
}
