// src/key_ops.rs
//! Key lifecycle: the one process-wide AES key
//!
//! The key lives in an env-file secret store (`NAME=value` lines) under the
//! reserved `ENCRYPTION_KEY` entry as 64 hex chars. Nothing else in the crate
//! reads that file; everything downstream receives the key by reference.
//!
//! Regenerating a key makes every blob sealed under the previous one
//! permanently unreadable. `load_or_create` reports that through
//! [`KeyOrigin::Regenerated`] so the caller can surface it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::aliases::{ArchiveKey32, SecureRandomExt};
use crate::consts::{KEY_ENTRY_NAME, KEY_LEN};
use crate::error::{CoreError, KeyMaterialProblem, Result};
use crate::util::{atomic_write, ensure_dir};

/// Generate a new random 256-bit key
#[inline]
pub fn generate_key() -> ArchiveKey32 {
    ArchiveKey32::random()
}

/// How the key handed out by [`KeyProvider::load_or_create`] came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Read back from the secret store
    Loaded,
    /// Secret store did not exist; a first key was written
    Generated,
    /// Stored material was unusable and has been replaced
    Regenerated(KeyMaterialProblem),
}

pub struct LoadedKey {
    pub key: ArchiveKey32,
    pub origin: KeyOrigin,
}

impl fmt::Debug for LoadedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedKey")
            .field("key", &"[REDACTED]")
            .field("origin", &self.origin)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct KeyProvider {
    secret_file: PathBuf,
    regenerate_invalid: bool,
}

impl KeyProvider {
    pub fn new(secret_file: impl Into<PathBuf>) -> Self {
        Self {
            secret_file: secret_file.into(),
            regenerate_invalid: true,
        }
    }

    /// When false, unusable key material is an error instead of being replaced
    pub fn regenerate_invalid(mut self, regenerate: bool) -> Self {
        self.regenerate_invalid = regenerate;
        self
    }

    pub fn secret_file(&self) -> &Path {
        &self.secret_file
    }

    /// Load the persisted key, or create and persist a fresh one.
    ///
    /// Writes the secret store at most once per call.
    pub fn load_or_create(&self) -> Result<LoadedKey> {
        let contents = match fs::read_to_string(&self.secret_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let key = generate_key();
                self.persist("", &key)?;
                info!(path = %self.secret_file.display(), "created new encryption key");
                return Ok(LoadedKey {
                    key,
                    origin: KeyOrigin::Generated,
                });
            }
            Err(e) => return Err(e.into()),
        };

        match parse_key(&contents) {
            Ok(key) => Ok(LoadedKey {
                key,
                origin: KeyOrigin::Loaded,
            }),
            Err(problem) if self.regenerate_invalid => {
                warn!(
                    path = %self.secret_file.display(),
                    %problem,
                    "invalid encryption key, regenerating; existing blobs become unreadable"
                );
                let key = generate_key();
                self.persist(&contents, &key)?;
                Ok(LoadedKey {
                    key,
                    origin: KeyOrigin::Regenerated(problem),
                })
            }
            Err(problem) => Err(CoreError::KeyMaterialInvalid(problem)),
        }
    }

    fn persist(&self, existing: &str, key: &ArchiveKey32) -> Result<()> {
        if let Some(parent) = self.secret_file.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        let rendered = replace_entry(existing, KEY_ENTRY_NAME, &hex::encode(key.expose_secret()));
        atomic_write(&self.secret_file, rendered.as_bytes())
    }
}

fn parse_key(contents: &str) -> std::result::Result<ArchiveKey32, KeyMaterialProblem> {
    let value = find_entry(contents, KEY_ENTRY_NAME).ok_or(KeyMaterialProblem::MissingEntry)?;

    if value.len() != KEY_LEN * 2 {
        let decoded = hex::decode(value).map_err(|_| KeyMaterialProblem::NotHex)?;
        return Err(KeyMaterialProblem::WrongLength { len: decoded.len() });
    }

    let mut bytes = [0u8; KEY_LEN];
    hex::decode_to_slice(value, &mut bytes).map_err(|_| KeyMaterialProblem::NotHex)?;
    Ok(ArchiveKey32::new(bytes))
}

/// Value of the last `name=value` line, with an optional `export ` prefix and quotes
fn find_entry<'a>(contents: &'a str, name: &str) -> Option<&'a str> {
    contents
        .lines()
        .filter_map(split_entry)
        .filter(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .last()
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), unquote(value.trim())))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Drop every definition of `name`, keep the other lines, append the new value
fn replace_entry(existing: &str, name: &str, value: &str) -> String {
    let mut out = String::with_capacity(existing.len() + name.len() + value.len() + 2);
    for line in existing.lines() {
        if matches!(split_entry(line), Some((k, _)) if k == name) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(name);
    out.push('=');
    out.push_str(value);
    out.push('\n');
    out
}
