// src/lib.rs
//! encrypted-object-store: confidential, integrity-checked object storage
//!
//! Features:
//! - AES-256-CBC blobs with an embedded random IV
//! - SHA-256 content digests as the integrity oracle
//! - Crash-safe JSON (or SQLite) catalog with atomic snapshot replace
//! - Write-temp-then-rename object publication
//! - Full secure-gate v0.5 integration for the process key

pub mod aliases;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod error;
pub mod key_ops;
pub mod object_store;
pub mod util;

// Re-export everything users need at the crate root
pub use aliases::{ArchiveKey32, SecureRandomExt};
pub use archive::{Archive, DeleteOutcome, ObjectSummary};
pub use catalog::{Catalog, CatalogEntries, JsonCatalog, ObjectRecord, SqliteCatalog};
pub use config::ArchiveConfig;
pub use error::{CoreError, MalformedReason, Result as CoreResult};
pub use key_ops::{KeyOrigin, KeyProvider, LoadedKey};
pub use object_store::ObjectStore;
