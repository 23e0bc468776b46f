// src/object_store.rs
//! Blob storage on the local file system
//!
//! One file per storage id: `<root>/<storage_id>.enc`, holding exactly the
//! bytes handed to [`ObjectStore::put`]. A blob is published by a no-clobber
//! rename of a fully written and fsynced temp file, so a reader sees either
//! nothing or the complete blob. Temp files use a dot prefix and never carry
//! the blob extension.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::BLOB_EXTENSION;
use crate::error::{CoreError, Result};
use crate::util::{atomic_create, blob_stem, ensure_dir, validate_storage_id};

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Store rooted at `root`, created if missing
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the blob for `storage_id`, after validating the id.
    /// `<id>` and `<id>.enc` resolve to the same file.
    pub fn blob_path(&self, storage_id: &str) -> Result<PathBuf> {
        validate_storage_id(storage_id)?;
        Ok(self
            .root
            .join(format!("{}.{BLOB_EXTENSION}", blob_stem(storage_id))))
    }

    /// Publish `blob` under `storage_id`. Fails with `BlobExists` if taken.
    pub fn put(&self, storage_id: &str, blob: &[u8]) -> Result<()> {
        let path = self.blob_path(storage_id)?;
        match atomic_create(&path, blob) {
            Ok(()) => {
                debug!(storage_id, bytes = blob.len(), "blob written");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(CoreError::BlobExists(storage_id.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, storage_id: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(storage_id)?;
        fs::read(&path).map_err(|e| not_found_as(e, storage_id))
    }

    pub fn delete(&self, storage_id: &str) -> Result<()> {
        let path = self.blob_path(storage_id)?;
        fs::remove_file(&path).map_err(|e| not_found_as(e, storage_id))?;
        debug!(storage_id, "blob removed");
        Ok(())
    }

    /// False for invalid ids as well as absent blobs
    pub fn exists(&self, storage_id: &str) -> bool {
        self.blob_path(storage_id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

fn not_found_as(err: io::Error, storage_id: &str) -> CoreError {
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::BlobNotFound(storage_id.to_owned())
    } else {
        CoreError::Io(err)
    }
}
