// src/catalog/sqlite.rs
//! SQLite-backed catalog
//!
//! Same snapshot contract as the JSON file: `save` rewrites the whole table
//! inside one transaction, so readers see the old rows or the new rows.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection};

use super::{fallback_name, Catalog, CatalogEntries, ObjectRecord};
use crate::error::Result;
use crate::util::ensure_dir;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS objects (
        storage_id        TEXT PRIMARY KEY,
        original_filename TEXT,
        hash              TEXT NOT NULL DEFAULT '',
        timestamp         INTEGER NOT NULL DEFAULT 0
    );
"#;

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Catalog for SqliteCatalog {
    fn load(&self) -> Result<CatalogEntries> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT storage_id, original_filename, hash, timestamp FROM objects")?;

        let rows = stmt.query_map([], |row| {
            let storage_id: String = row.get(0)?;
            let original_name: Option<String> = row.get(1)?;
            Ok(ObjectRecord {
                original_name: original_name.unwrap_or_else(|| fallback_name(&storage_id)),
                content_digest: row.get(2)?,
                created_at: row.get(3)?,
                storage_id,
            })
        })?;

        let mut entries = CatalogEntries::new();
        for row in rows {
            let record = row?;
            entries.insert(record.storage_id.clone(), record);
        }
        Ok(entries)
    }

    fn save(&self, entries: &CatalogEntries) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM objects", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO objects (storage_id, original_filename, hash, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in entries.values() {
                insert.execute(params![
                    record.storage_id,
                    record.original_name,
                    record.content_digest,
                    record.created_at
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
