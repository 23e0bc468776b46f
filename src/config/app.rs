// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::catalog::CorruptPolicy;
use crate::consts::{DEFAULT_CATALOG_FILE, DEFAULT_CONFIG_FILE, DEFAULT_SQLITE_FILE};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub storage: Storage,
    pub keys: Keys,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Directory holding blobs (and, by default, the catalog)
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Keys {
    /// Env-file secret store holding `ENCRYPTION_KEY`
    pub secret_file: PathBuf,
    /// Replace unusable key material instead of refusing to start
    pub regenerate_invalid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub backend: CatalogBackend,
    /// Overrides the default location inside the storage root
    pub path: Option<PathBuf>,
    pub on_corrupt: CorruptPolicy,
}

impl ArchiveConfig {
    /// Load from `EOS_CONFIG` (default `archive.toml`), falling back to defaults
    /// when the file does not exist. `EOS_STORAGE_ROOT` wins over the file.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("EOS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);

        let mut conf = if path.exists() {
            Self::from_path(path)?
        } else {
            warn!(path = %path.display(), "config file not found, using built-in defaults");
            Self::default()
        };

        if let Ok(root) = std::env::var("EOS_STORAGE_ROOT") {
            conf.storage.root = PathBuf::from(root);
        }

        Ok(conf)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Where the configured catalog backend keeps its state
    pub fn catalog_path(&self) -> PathBuf {
        if let Some(path) = &self.catalog.path {
            return path.clone();
        }
        let file = match self.catalog.backend {
            CatalogBackend::Json => DEFAULT_CATALOG_FILE,
            CatalogBackend::Sqlite => DEFAULT_SQLITE_FILE,
        };
        self.storage.root.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let conf = ArchiveConfig::from_toml_str("").unwrap();
        assert_eq!(conf.storage.root, PathBuf::from("uploads"));
        assert_eq!(conf.keys.secret_file, PathBuf::from(".env"));
        assert!(conf.keys.regenerate_invalid);
        assert_eq!(conf.catalog.backend, CatalogBackend::Json);
        assert_eq!(conf.catalog.on_corrupt, CorruptPolicy::Reset);
        assert_eq!(conf.catalog_path(), PathBuf::from("uploads/metadata.json"));
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let conf = ArchiveConfig::from_toml_str(
            r#"
            [storage]
            root = "/srv/objects"

            [catalog]
            backend = "sqlite"
            on_corrupt = "fail"
            "#,
        )
        .unwrap();
        assert_eq!(conf.storage.root, PathBuf::from("/srv/objects"));
        assert_eq!(conf.keys.secret_file, PathBuf::from(".env"));
        assert_eq!(conf.catalog.on_corrupt, CorruptPolicy::Fail);
        assert_eq!(conf.catalog_path(), PathBuf::from("/srv/objects/catalog.db"));
    }

    #[test]
    fn explicit_catalog_path_wins() {
        let conf = ArchiveConfig::from_toml_str("[catalog]\npath = \"/tmp/meta.json\"\n").unwrap();
        assert_eq!(conf.catalog_path(), PathBuf::from("/tmp/meta.json"));
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let err = ArchiveConfig::from_toml_str("[catalog]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
