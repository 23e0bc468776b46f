// tests/support.rs
//! Test fixture: a fully wired archive inside a temp directory

use std::path::PathBuf;

use encrypted_object_store::config::CatalogBackend;
use encrypted_object_store::{Archive, ArchiveConfig};
use tempfile::TempDir;

#[allow(dead_code)] // Not every test binary touches every helper
pub struct TestArchive {
    pub dir: TempDir,
    pub config: ArchiveConfig,
    pub archive: Archive,
}

#[allow(dead_code)]
impl TestArchive {
    pub fn new() -> Self {
        Self::with_backend(CatalogBackend::Json)
    }

    pub fn with_backend(backend: CatalogBackend) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ArchiveConfig::default();
        config.storage.root = dir.path().join("uploads");
        config.keys.secret_file = dir.path().join(".env");
        config.catalog.backend = backend;
        let archive = Archive::open(&config).unwrap();
        Self {
            dir,
            config,
            archive,
        }
    }

    /// Simulate a process restart against the same directories
    pub fn reopen(&self) -> Archive {
        Archive::open(&self.config).unwrap()
    }

    pub fn blob_path(&self, storage_id: &str) -> PathBuf {
        self.archive.objects().blob_path(storage_id).unwrap()
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.config.catalog_path()
    }

    pub fn secret_path(&self) -> PathBuf {
        self.config.keys.secret_file.clone()
    }
}
