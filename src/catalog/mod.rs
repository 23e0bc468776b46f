// src/catalog/mod.rs
//! Durable index: storage id → object provenance
//!
//! A catalog is a whole-snapshot store. `load` returns the last complete
//! snapshot and `save` replaces it in one step, so a crash leaves either the
//! old or the new mapping. Records are only ever inserted or removed.
//!
//! `load` may create a missing store but never replaces or moves existing
//! data. Repairs that do (moving a corrupt snapshot aside) live in
//! `load_for_update`, which callers run under the same lock as `save`.
//!
//! Two backends ship: [`JsonCatalog`] (the default, one JSON document) and
//! [`SqliteCatalog`] (one table rewritten inside a transaction).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::util::blob_stem;

mod json;
mod sqlite;

pub use json::JsonCatalog;
pub use sqlite::SqliteCatalog;

/// Provenance of one stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub storage_id: String,
    pub original_name: String,
    /// Lowercase hex SHA-256 of the plaintext
    pub content_digest: String,
    /// Unix seconds
    pub created_at: i64,
}

/// Full catalog state, keyed by storage id
pub type CatalogEntries = BTreeMap<String, ObjectRecord>;

/// What a catalog does with a snapshot it cannot parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Read as empty; the next update moves the file aside and starts over
    #[default]
    Reset,
    /// Return `CatalogCorrupt` to the caller
    Fail,
}

pub trait Catalog: Send + Sync {
    /// Last published snapshot; safe to call without the writer lock
    fn load(&self) -> Result<CatalogEntries>;

    /// First half of a load-mutate-save cycle; may repair the store on disk.
    /// Callers must serialize this with `save`.
    fn load_for_update(&self) -> Result<CatalogEntries> {
        self.load()
    }

    fn save(&self, entries: &CatalogEntries) -> Result<()>;
}

/// Display name for records that lost their `original_filename`
pub fn fallback_name(storage_id: &str) -> String {
    blob_stem(storage_id).to_owned()
}
