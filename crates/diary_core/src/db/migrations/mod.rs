//! Diary schema migrations.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps for the diary store.
//! - Bring a connection from its recorded version to [`latest_version`]
//!   in one transaction.
//!
//! # Invariants
//! - Step `n` (1-based) in `SCHEMA_STEPS` moves the schema to version `n`.
//! - The reached version is recorded in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One schema step: a short label for logs plus its SQL batch.
type SchemaStep = (&'static str, &'static str);

const SCHEMA_STEPS: &[SchemaStep] = &[
    ("entries_categories_tags", include_str!("0001_init.sql")),
    ("pages_profile", include_str!("0002_pages_profile.sql")),
];

/// Schema version produced by the last known step.
pub fn latest_version() -> u32 {
    u32::try_from(SCHEMA_STEPS.len()).unwrap_or(u32::MAX)
}

/// Applies every step above the connection's recorded version.
///
/// Returns the number of steps applied; `0` when already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from = recorded_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(from);
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, (label, sql)) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        debug!("event=db_migrate module=db status=ok version={version} step={label}");
    }
    tx.commit()?;

    let applied = usize::try_from(latest - from).unwrap_or(usize::MAX);
    info!("event=db_migrate module=db status=done from={from} to={latest} applied={applied}");
    Ok(applied)
}

fn pending_steps(from: u32) -> Vec<(u32, SchemaStep)> {
    (1u32..)
        .zip(SCHEMA_STEPS.iter().copied())
        .filter(|(version, _)| *version > from)
        .collect()
}

fn recorded_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
