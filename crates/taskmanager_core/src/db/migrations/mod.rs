//! Versioned schema for the task store.
//!
//! Entry `n` of [`SCHEMA`] (1-based) takes the database to
//! `PRAGMA user_version = n`. Entries are append-only.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};
use std::time::Instant;

const SCHEMA: &[&str] = &[include_str!("0001_init.sql")];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA.len() as u32
}

/// Reads the version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to [`latest_version`] in a single transaction.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a
///   newer build. Nothing is touched in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending = &SCHEMA[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in (found + 1..).zip(pending) {
        migrate_to(&tx, version, sql)?;
    }
    tx.commit()?;
    Ok(())
}

fn migrate_to(tx: &Transaction<'_>, version: u32, sql: &str) -> DbResult<()> {
    let started_at = Instant::now();
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", version)?;
    info!(
        "event=db_migrate module=db status=ok version={} duration_ms={}",
        version,
        started_at.elapsed().as_millis()
    );
    Ok(())
}
