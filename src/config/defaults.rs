// src/config/defaults.rs
use std::path::PathBuf;

use crate::catalog::CorruptPolicy;
use crate::config::app::{CatalogBackend, CatalogSettings, Keys, Storage};
use crate::consts::{DEFAULT_SECRET_FILE, DEFAULT_STORAGE_ROOT};

impl Default for Storage {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORAGE_ROOT),
        }
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            secret_file: PathBuf::from(DEFAULT_SECRET_FILE),
            regenerate_invalid: true,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Json,
            path: None,
            on_corrupt: CorruptPolicy::Reset,
        }
    }
}
