//! SQLite connection management for the local store.
//!
//! CHANGELOG:
//! - 10/18/2026 - Read-write store with schema bootstrap

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::queries;

/// Open (or create) the store at `path` and apply the schema.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open store at {:?}", path))?;
    init(&conn).with_context(|| format!("Failed to initialize store at {:?}", path))?;
    Ok(conn)
}

/// In-memory store (tests, dry runs).
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
    init(&conn).context("Failed to initialize in-memory store")?;
    Ok(conn)
}

fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(queries::SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let conn = open_store(&path).unwrap();
        assert!(path.exists());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('device', 'lid_map', 'contacts')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        drop(open_store(&path).unwrap());
        assert!(open_store(&path).is_ok());
    }
}
