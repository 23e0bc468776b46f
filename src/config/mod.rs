// src/config/mod.rs
//! Configuration system for encrypted-object-store
//!
//! TOML file (path from `EOS_CONFIG`) with built-in defaults and a single
//! env override for the storage root. Loaded once by the embedding process
//! and passed to [`crate::Archive::open`]; there is no global config.

pub use app::{ArchiveConfig, CatalogBackend, CatalogSettings, Keys, Storage};

mod app;
mod defaults;
