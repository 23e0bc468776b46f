// src/util.rs
//! Small utility functions shared by the catalog, object store and key provider
//!
//! Keep this light. If it grows, split further.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use rand::RngCore;
use tempfile::NamedTempFile;

use crate::consts::{BLOB_EXTENSION, MAX_STORAGE_ID_LEN, TEMP_PREFIX};
use crate::error::{CoreError, Result};

/// Fresh random 128-bit storage id rendered as 32 lowercase hex chars
pub fn new_storage_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `storage_id` without a trailing `.enc`.
///
/// Catalogs written by the earlier service key their records by blob file
/// name (`<uid>.enc`); both spellings address the same blob.
pub fn blob_stem(storage_id: &str) -> &str {
    storage_id
        .strip_suffix(BLOB_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(storage_id)
}

/// Accept a plain `[A-Za-z0-9_-]` file-name component, optionally followed by `.enc`
pub fn validate_storage_id(storage_id: &str) -> Result<()> {
    let stem = blob_stem(storage_id);
    let ok = !stem.is_empty()
        && storage_id.len() <= MAX_STORAGE_ID_LEN
        && stem
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidStorageId(storage_id.to_owned()))
    }
}

/// Write into a temp file next to `target`, fsync it, then rename over `target`.
///
/// The temp file lives in the same directory so the rename never crosses a
/// file system. A crash leaves either the old or the new file, never a mix.
/// On failure the temp file is removed when the handle drops. tempfile
/// creates it owner-only (0600 on Unix) and the rename keeps that mode.
pub fn atomic_write(target: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = stage_temp(target, bytes)?;
    tmp.persist(target).map_err(|e| CoreError::Io(e.error))?;
    sync_parent(target)?;
    Ok(())
}

/// Like [`atomic_write`] but fails with `AlreadyExists` instead of replacing.
pub fn atomic_create(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = stage_temp(target, bytes)?;
    tmp.persist_noclobber(target).map_err(|e| e.error)?;
    sync_parent(target)
}

fn stage_temp(target: &Path, bytes: &[u8]) -> io::Result<NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent_dir(target))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Make the rename itself durable
#[cfg(unix)]
fn sync_parent(target: &Path) -> io::Result<()> {
    fs::File::open(parent_dir(target))?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_target: &Path) -> io::Result<()> {
    Ok(())
}

/// Create `dir` (and parents) if it does not exist yet
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}
