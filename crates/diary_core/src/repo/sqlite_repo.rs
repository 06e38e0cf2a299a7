//! SQLite-backed content repository.
//!
//! # Invariants
//! - Entry writes replace the entry's category/tag link rows, and create
//!   missing categories, in the same transaction as the entry row. A rejected
//!   entry write leaves no category behind.
//! - Newest-first reads order by `publish_time DESC, uuid DESC`; oldest-first
//!   is the exact reverse. Text uuids compare the same way `Uuid` does.

use crate::model::catalog::{Category, Page, Profile};
use crate::model::entry::{Entry, EntryBody, EntryId, EntryStatus, OrderKey};
use crate::repo::content_repo::{
    ContentRepository, EntryFilter, RepoError, RepoResult, SortOrder, Toward,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    permalink,
    title,
    content,
    rendered_content,
    plain_text,
    summary,
    status,
    author,
    publish_time
FROM entries";

const REQUIRED_TABLES: [&str; 6] = [
    "entries",
    "entry_categories",
    "entry_tags",
    "categories",
    "pages",
    "profile",
];

/// SQLite-backed implementation of [`ContentRepository`].
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn load_entries(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(self.conn, row)?);
        }
        Ok(entries)
    }

    fn load_single_entry(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Option<Entry>> {
        Ok(self.load_entries(sql, bind_values)?.into_iter().next())
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn insert_entry(&self, entry: &Entry) -> RepoResult<EntryId> {
        entry.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO entries (
                uuid,
                permalink,
                title,
                content,
                rendered_content,
                plain_text,
                summary,
                status,
                author,
                publish_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                entry.id.to_string(),
                entry.permalink.as_str(),
                entry.title.as_str(),
                entry.body.content(),
                entry.body.rendered_content(),
                entry.body.plain_text(),
                entry.body.summary(),
                entry.status.as_str(),
                entry.author.as_str(),
                entry.publish_time,
            ],
        )
        .map_err(|err| unique_violation(err, "permalink", &entry.permalink))?;
        replace_entry_links(&tx, entry)?;
        tx.commit()?;

        Ok(entry.id)
    }

    fn update_entry(&self, entry: &Entry) -> RepoResult<()> {
        entry.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx
            .execute(
                "UPDATE entries
                 SET
                    permalink = ?2,
                    title = ?3,
                    content = ?4,
                    rendered_content = ?5,
                    plain_text = ?6,
                    summary = ?7,
                    status = ?8,
                    author = ?9,
                    publish_time = ?10,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![
                    entry.id.to_string(),
                    entry.permalink.as_str(),
                    entry.title.as_str(),
                    entry.body.content(),
                    entry.body.rendered_content(),
                    entry.body.plain_text(),
                    entry.body.summary(),
                    entry.status.as_str(),
                    entry.author.as_str(),
                    entry.publish_time,
                ],
            )
            .map_err(|err| unique_violation(err, "permalink", &entry.permalink))?;

        if changed == 0 {
            return Err(RepoError::NotFound(entry.id));
        }

        replace_entry_links(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        self.load_single_entry(
            &format!("{ENTRY_SELECT_SQL} WHERE uuid = ?1;"),
            vec![Value::Text(id.to_string())],
        )
    }

    fn find_entry_by_permalink(&self, permalink: &str) -> RepoResult<Option<Entry>> {
        self.load_single_entry(
            &format!("{ENTRY_SELECT_SQL} WHERE permalink = ?1;"),
            vec![Value::Text(permalink.to_string())],
        )
    }

    fn ordered_entries(
        &self,
        filter: &EntryFilter,
        order: SortOrder,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<Entry>> {
        let (where_sql, mut bind_values) = filter_clause(filter);
        let sql = format!(
            "{ENTRY_SELECT_SQL}{where_sql} {} LIMIT ? OFFSET ?;",
            order_clause(order)
        );
        bind_values.push(Value::Integer(clamp_to_i64(limit)));
        bind_values.push(Value::Integer(clamp_to_i64(offset)));
        self.load_entries(&sql, bind_values)
    }

    fn count_entries(&self, filter: &EntryFilter) -> RepoResult<u64> {
        let (where_sql, bind_values) = filter_clause(filter);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM entries{where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn adjacent_entry(&self, anchor: &OrderKey, toward: Toward) -> RepoResult<Option<Entry>> {
        let condition = match toward {
            Toward::Older => {
                "WHERE publish_time < ?1 OR (publish_time = ?1 AND uuid < ?2)
                 ORDER BY publish_time DESC, uuid DESC"
            }
            Toward::Newer => {
                "WHERE publish_time > ?1 OR (publish_time = ?1 AND uuid > ?2)
                 ORDER BY publish_time ASC, uuid ASC"
            }
        };
        self.load_single_entry(
            &format!("{ENTRY_SELECT_SQL} {condition} LIMIT 1;"),
            vec![
                Value::Integer(anchor.publish_time),
                Value::Text(anchor.id.to_string()),
            ],
        )
    }

    fn insert_category(&self, name: &str) -> RepoResult<Category> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1);", [name])
            .map_err(|err| unique_violation(err, "category name", name))?;
        self.find_category(name)?.ok_or_else(|| {
            RepoError::InvalidData(format!("category `{name}` missing after insert"))
        })
    }

    fn upsert_category(&self, name: &str) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (name) VALUES (?1)
             ON CONFLICT (name) DO NOTHING;",
            [name],
        )?;
        self.find_category(name)?.ok_or_else(|| {
            RepoError::InvalidData(format!("category `{name}` missing after upsert"))
        })
    }

    fn find_category(&self, name: &str) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM categories WHERE name = ?1;",
                [name],
                parse_category_row,
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM categories ORDER BY name ASC;")?;
        let categories = stmt
            .query_map([], parse_category_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn count_categories(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn insert_page(&self, page: &Page) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO pages (uuid, url, title, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    page.id.to_string(),
                    page.url.as_str(),
                    page.title.as_str(),
                    page.content.as_str(),
                    page.created_at,
                ],
            )
            .map_err(|err| unique_violation(err, "page url", &page.url))?;
        Ok(())
    }

    fn find_page(&self, url: &str) -> RepoResult<Option<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, url, title, content, created_at FROM pages WHERE url = ?1;",
        )?;
        let mut rows = stmt.query([url])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_page_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_pages(&self) -> RepoResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, url, title, content, created_at
             FROM pages
             ORDER BY created_at DESC, uuid DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn get_profile(&self) -> RepoResult<Option<Profile>> {
        let profile = self
            .conn
            .query_row("SELECT name, bio FROM profile WHERE id = 1;", [], |row| {
                Ok(Profile {
                    name: row.get("name")?,
                    bio: row.get("bio")?,
                })
            })
            .optional()?;
        Ok(profile)
    }

    fn put_profile(&self, profile: &Profile) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO profile (id, name, bio) VALUES (1, ?1, ?2)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                bio = excluded.bio,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![profile.name.as_str(), profile.bio.as_deref()],
        )?;
        Ok(())
    }
}

fn filter_clause(filter: &EntryFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if let Some(category) = filter.category.as_ref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1
                FROM entry_categories ec
                WHERE ec.entry_uuid = entries.uuid
                  AND ec.category_name = ?
            )",
        );
        bind_values.push(Value::Text(category.clone()));
    }

    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        bind_values.push(Value::Text(status.as_str().to_string()));
    }

    (sql, bind_values)
}

fn order_clause(order: SortOrder) -> &'static str {
    match order {
        SortOrder::NewestFirst => "ORDER BY publish_time DESC, uuid DESC",
        SortOrder::OldestFirst => "ORDER BY publish_time ASC, uuid ASC",
    }
}

fn replace_entry_links(conn: &Connection, entry: &Entry) -> RepoResult<()> {
    let entry_uuid = entry.id.to_string();

    conn.execute(
        "DELETE FROM entry_categories WHERE entry_uuid = ?1;",
        [entry_uuid.as_str()],
    )?;
    for category in &entry.categories {
        conn.execute(
            "INSERT INTO categories (name) VALUES (?1)
             ON CONFLICT (name) DO NOTHING;",
            [category.as_str()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO entry_categories (entry_uuid, category_name)
             VALUES (?1, ?2);",
            params![entry_uuid.as_str(), category.as_str()],
        )?;
    }

    conn.execute(
        "DELETE FROM entry_tags WHERE entry_uuid = ?1;",
        [entry_uuid.as_str()],
    )?;
    for tag in &entry.tags {
        conn.execute(
            "INSERT OR IGNORE INTO entry_tags (entry_uuid, tag) VALUES (?1, ?2);",
            params![entry_uuid.as_str(), tag.as_str()],
        )?;
    }

    Ok(())
}

fn parse_entry_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Entry> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "entries.uuid")?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<EntryStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in entries.status"))
    })?;

    let body = EntryBody::from_persisted(
        row.get("content")?,
        row.get("rendered_content")?,
        row.get("plain_text")?,
        row.get("summary")?,
    );

    Ok(Entry {
        id,
        permalink: row.get("permalink")?,
        title: row.get("title")?,
        body,
        categories: load_link_values(
            conn,
            "SELECT category_name FROM entry_categories
             WHERE entry_uuid = ?1 ORDER BY category_name ASC;",
            &uuid_text,
        )?,
        tags: load_link_values(
            conn,
            "SELECT tag FROM entry_tags WHERE entry_uuid = ?1 ORDER BY tag ASC;",
            &uuid_text,
        )?,
        status,
        author: row.get("author")?,
        publish_time: row.get("publish_time")?,
    })
}

fn load_link_values(conn: &Connection, sql: &str, entry_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let values = stmt
        .query_map([entry_uuid], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_page_row(row: &Row<'_>) -> RepoResult<Page> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Page {
        id: parse_uuid(&uuid_text, "pages.uuid")?,
        url: row.get("url")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn unique_violation(err: rusqlite::Error, field: &'static str, value: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::NotUnique {
                field,
                value: value.to_string(),
            }
        }
        _ => err.into(),
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
