// src/catalog/json.rs
//! JSON snapshot catalog
//!
//! Document layout, one object keyed by storage id:
//!
//! ```json
//! { "3f2a…": { "original_filename": "report.txt", "hash": "b94d…", "timestamp": 1700000000 } }
//! ```
//!
//! Unknown fields are ignored. Missing or null fields fall back to a name
//! derived from the storage id, an empty hash (never verifies) and time 0.
//!
//! An absent snapshot is created empty with a no-clobber create, so a reader
//! can never replace a snapshot a writer published meanwhile. Plain `load`
//! reads a corrupt snapshot as empty and leaves the file alone; moving it to
//! `<path>.corrupt-<millis>` only happens in `load_for_update`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{fallback_name, Catalog, CatalogEntries, CorruptPolicy, ObjectRecord};
use crate::error::{CoreError, Result};
use crate::util::{atomic_create, atomic_write, ensure_dir};

const EMPTY_SNAPSHOT: &[u8] = b"{}";

#[derive(Debug, Serialize, Deserialize)]
struct DiskRecord {
    #[serde(default)]
    original_filename: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl DiskRecord {
    fn into_record(self, storage_id: String) -> ObjectRecord {
        ObjectRecord {
            original_name: self
                .original_filename
                .unwrap_or_else(|| fallback_name(&storage_id)),
            content_digest: self.hash.unwrap_or_default(),
            created_at: self.timestamp.unwrap_or(0),
            storage_id,
        }
    }
}

impl From<&ObjectRecord> for DiskRecord {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            original_filename: Some(record.original_name.clone()),
            hash: Some(record.content_digest.clone()),
            timestamp: Some(record.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
    on_corrupt: CorruptPolicy,
}

impl JsonCatalog {
    /// Catalog stored at `path`; the parent directory is created if missing
    pub fn open(path: impl Into<PathBuf>, on_corrupt: CorruptPolicy) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        Ok(Self { path, on_corrupt })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", chrono::Utc::now().timestamp_millis()));
        PathBuf::from(name)
    }

    /// Parse the snapshot on disk; `Ok(None)` when there is none yet
    fn read_snapshot(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = match serde_json::from_slice::<BTreeMap<String, DiskRecord>>(&bytes) {
            Ok(doc) => Snapshot::Valid(
                doc.into_iter()
                    .map(|(id, disk)| (id.clone(), disk.into_record(id)))
                    .collect(),
            ),
            Err(cause) => {
                let err = CoreError::CatalogCorrupt(format!("{}: {cause}", self.path.display()));
                Snapshot::Corrupt(err)
            }
        };
        Ok(Some(snapshot))
    }

    /// Write `{}` unless some snapshot already exists
    fn create_empty(&self) -> Result<CatalogEntries> {
        match atomic_create(&self.path, EMPTY_SNAPSHOT) {
            Ok(()) => debug!(path = %self.path.display(), "no catalog snapshot yet, wrote one"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(CatalogEntries::new())
    }

    /// Move a corrupt snapshot aside so the next `save` starts clean
    fn quarantine(&self, err: &CoreError) {
        let quarantine = self.quarantine_path();
        match fs::rename(&self.path, &quarantine) {
            Ok(()) => error!(
                path = %self.path.display(),
                moved_to = %quarantine.display(),
                %err,
                "catalog snapshot unreadable, continuing with an empty catalog"
            ),
            Err(move_err) => error!(
                path = %self.path.display(),
                %err,
                %move_err,
                "catalog snapshot unreadable and not moved aside, continuing empty"
            ),
        }
    }
}

enum Snapshot {
    Valid(CatalogEntries),
    Corrupt(CoreError),
}

impl Catalog for JsonCatalog {
    fn load(&self) -> Result<CatalogEntries> {
        match self.read_snapshot()? {
            None => self.create_empty(),
            Some(Snapshot::Valid(entries)) => Ok(entries),
            Some(Snapshot::Corrupt(err)) if self.on_corrupt == CorruptPolicy::Fail => {
                error!(path = %self.path.display(), %err, "catalog snapshot unreadable");
                Err(err)
            }
            Some(Snapshot::Corrupt(err)) => {
                warn!(
                    path = %self.path.display(),
                    %err,
                    "catalog snapshot unreadable, reading as empty"
                );
                Ok(CatalogEntries::new())
            }
        }
    }

    fn load_for_update(&self) -> Result<CatalogEntries> {
        match self.read_snapshot()? {
            None => self.create_empty(),
            Some(Snapshot::Valid(entries)) => Ok(entries),
            Some(Snapshot::Corrupt(err)) if self.on_corrupt == CorruptPolicy::Fail => {
                error!(path = %self.path.display(), %err, "catalog snapshot unreadable");
                Err(err)
            }
            Some(Snapshot::Corrupt(err)) => {
                self.quarantine(&err);
                Ok(CatalogEntries::new())
            }
        }
    }

    fn save(&self, entries: &CatalogEntries) -> Result<()> {
        let doc: BTreeMap<&str, DiskRecord> = entries
            .iter()
            .map(|(id, record)| (id.as_str(), DiskRecord::from(record)))
            .collect();
        let bytes = serde_json::to_vec_pretty(&doc)?;
        atomic_write(&self.path, &bytes)?;
        debug!(path = %self.path.display(), records = entries.len(), "catalog saved");
        Ok(())
    }
}
