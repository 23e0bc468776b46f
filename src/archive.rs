// src/archive.rs
//! Archive: the put/get/delete/list surface over key, catalog and blobs
//!
//! Write order is blob first, catalog second. A crash in between leaves an
//! orphan blob, never a record that points at nothing. Every catalog
//! load-mutate-save runs under one lock, so concurrent puts and deletes on a
//! shared `Archive` cannot lose each other's updates. Reads work on the last
//! published snapshot and take no lock; `Catalog::load` never replaces
//! existing data.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::aliases::ArchiveKey32;
use crate::catalog::{Catalog, JsonCatalog, ObjectRecord, SqliteCatalog};
use crate::config::{ArchiveConfig, CatalogBackend};
use crate::consts::{DISPLAY_TIME_FORMAT, STORAGE_ID_ATTEMPTS};
use crate::crypto;
use crate::error::{CoreError, Result};
use crate::key_ops::{KeyOrigin, KeyProvider, LoadedKey};
use crate::object_store::ObjectStore;
use crate::util::{new_storage_id, validate_storage_id};

/// Result of [`Archive::delete`]. All three mean the object is gone now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Record and blob were both removed
    Deleted,
    /// Only one side still existed
    Partial {
        record_removed: bool,
        blob_removed: bool,
    },
    /// Neither a record nor a blob existed
    NotFound,
}

/// One row of [`Archive::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub storage_id: String,
    pub name: String,
    pub created_at: i64,
}

impl ObjectSummary {
    /// `YYYY-MM-DD HH:MM:SS` in UTC; `None` when the timestamp is out of range
    pub fn created_at_display(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp(self.created_at, 0)
            .map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())
    }
}

impl From<ObjectRecord> for ObjectSummary {
    fn from(record: ObjectRecord) -> Self {
        Self {
            storage_id: record.storage_id,
            name: record.original_name,
            created_at: record.created_at,
        }
    }
}

pub struct Archive {
    key: ArchiveKey32,
    key_origin: KeyOrigin,
    catalog: Box<dyn Catalog>,
    objects: ObjectStore,
    catalog_lock: Mutex<()>,
}

impl Archive {
    /// Assemble an archive from parts. The catalog is used as is; it is not
    /// created or repaired until the first put or delete.
    pub fn new(key: LoadedKey, catalog: Box<dyn Catalog>, objects: ObjectStore) -> Self {
        Self {
            key: key.key,
            key_origin: key.origin,
            catalog,
            objects,
            catalog_lock: Mutex::new(()),
        }
    }

    /// Wire up key provider, catalog backend and object store from config.
    ///
    /// Check [`Archive::key_origin`] afterwards: `Regenerated` means every
    /// object written before this start can no longer be decrypted.
    pub fn open(config: &ArchiveConfig) -> Result<Self> {
        let loaded = KeyProvider::new(&config.keys.secret_file)
            .regenerate_invalid(config.keys.regenerate_invalid)
            .load_or_create()?;
        let objects = ObjectStore::open(&config.storage.root)?;

        let catalog_path = config.catalog_path();
        let catalog: Box<dyn Catalog> = match config.catalog.backend {
            CatalogBackend::Json => {
                Box::new(JsonCatalog::open(catalog_path, config.catalog.on_corrupt)?)
            }
            CatalogBackend::Sqlite => Box::new(SqliteCatalog::open(&catalog_path)?),
        };
        // Creates an empty snapshot on first start
        catalog.load_for_update()?;

        info!(
            root = %config.storage.root.display(),
            backend = ?config.catalog.backend,
            key_origin = ?loaded.origin,
            "archive opened"
        );

        Ok(Self::new(loaded, catalog, objects))
    }

    pub fn key_origin(&self) -> KeyOrigin {
        self.key_origin
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    /// Encrypt and store `plaintext`; always returns a new storage id
    pub fn put(&self, original_name: &str, plaintext: &[u8]) -> Result<String> {
        let content_digest = crypto::fingerprint(plaintext);
        let blob = crypto::encrypt(&self.key, plaintext);
        let storage_id = self.publish_blob(&blob)?;

        let record = ObjectRecord {
            storage_id: storage_id.clone(),
            original_name: original_name.to_owned(),
            content_digest,
            created_at: Utc::now().timestamp(),
        };

        if let Err(err) = self.insert_record(record) {
            if let Err(cleanup) = self.objects.delete(&storage_id) {
                warn!(%storage_id, %cleanup, "catalog update failed and blob could not be removed");
            }
            return Err(err);
        }

        info!(%storage_id, name = original_name, bytes = plaintext.len(), "object stored");
        Ok(storage_id)
    }

    /// Decrypt and verify; returns `(original_name, plaintext)`.
    ///
    /// Plaintext is only returned after its digest matches the catalog.
    pub fn get(&self, storage_id: &str) -> Result<(String, Vec<u8>)> {
        validate_storage_id(storage_id)?;

        let record = self
            .catalog
            .load()?
            .remove(storage_id)
            .ok_or_else(|| CoreError::RecordNotFound(storage_id.to_owned()))?;

        let blob = self.objects.get(storage_id).inspect_err(|e| {
            if matches!(e, CoreError::BlobNotFound(_)) {
                warn!(storage_id, "catalog record without blob");
            }
        })?;

        let plaintext = crypto::decrypt(&self.key, &blob).map_err(|e| match e {
            CoreError::MalformedCiphertext(reason) => {
                warn!(storage_id, %reason, "blob failed to decrypt");
                CoreError::DecryptionFailed {
                    storage_id: storage_id.to_owned(),
                    reason,
                }
            }
            other => other,
        })?;

        if !crypto::verify(&plaintext, &record.content_digest) {
            warn!(storage_id, "digest mismatch, refusing to return content");
            return Err(CoreError::IntegrityCheckFailed {
                storage_id: storage_id.to_owned(),
            });
        }

        debug!(storage_id, bytes = plaintext.len(), "object read");
        Ok((record.original_name, plaintext))
    }

    /// Remove the record and the blob independently.
    ///
    /// The record goes first so an interrupted delete leaves an orphan blob
    /// rather than a dangling record. Absence on either side is not an error.
    pub fn delete(&self, storage_id: &str) -> Result<DeleteOutcome> {
        validate_storage_id(storage_id)?;

        let record_result = self.remove_record(storage_id);
        let blob_result = match self.objects.delete(storage_id) {
            Ok(()) => Ok(true),
            Err(CoreError::BlobNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        };

        let record_removed = record_result?;
        let blob_removed = blob_result?;

        let outcome = match (record_removed, blob_removed) {
            (true, true) => DeleteOutcome::Deleted,
            (false, false) => DeleteOutcome::NotFound,
            (record_removed, blob_removed) => DeleteOutcome::Partial {
                record_removed,
                blob_removed,
            },
        };
        info!(storage_id, ?outcome, "object deleted");
        Ok(outcome)
    }

    /// Objects whose blob is present, newest first
    pub fn list(&self) -> Result<Vec<ObjectSummary>> {
        let mut summaries: Vec<ObjectSummary> = self
            .catalog
            .load()?
            .into_values()
            .filter(|record| self.objects.exists(&record.storage_id))
            .map(ObjectSummary::from)
            .collect();

        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.storage_id.cmp(&b.storage_id))
        });
        Ok(summaries)
    }

    fn publish_blob(&self, blob: &[u8]) -> Result<String> {
        let mut storage_id = new_storage_id();
        for attempt in 1..=STORAGE_ID_ATTEMPTS {
            match self.objects.put(&storage_id, blob) {
                Ok(()) => return Ok(storage_id),
                Err(CoreError::BlobExists(_)) if attempt < STORAGE_ID_ATTEMPTS => {
                    warn!(%storage_id, attempt, "storage id already taken, drawing another");
                    storage_id = new_storage_id();
                }
                Err(e) => return Err(e),
            }
        }
        Err(CoreError::BlobExists(storage_id))
    }

    fn insert_record(&self, record: ObjectRecord) -> Result<()> {
        let _guard = self.lock_catalog();
        let mut entries = self.catalog.load_for_update()?;
        if entries.contains_key(&record.storage_id) {
            return Err(CoreError::BlobExists(record.storage_id));
        }
        entries.insert(record.storage_id.clone(), record);
        self.catalog.save(&entries)
    }

    fn remove_record(&self, storage_id: &str) -> Result<bool> {
        let _guard = self.lock_catalog();
        let mut entries = self.catalog.load_for_update()?;
        if entries.remove(storage_id).is_none() {
            return Ok(false);
        }
        self.catalog.save(&entries)?;
        Ok(true)
    }

    fn lock_catalog(&self) -> MutexGuard<'_, ()> {
        self.catalog_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
