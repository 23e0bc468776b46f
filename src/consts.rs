// src/consts.rs
//! Shared constants: framing sizes, file names and defaults

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// CBC initialization vector length, prepended to every blob
pub const IV_LEN: usize = 16;

/// AES block size
pub const BLOCK_LEN: usize = 16;

/// Reserved entry in the secret store holding the hex-encoded key
pub const KEY_ENTRY_NAME: &str = "ENCRYPTION_KEY";

/// Extension given to every blob file in the object store
pub const BLOB_EXTENSION: &str = "enc";

/// Prefix of in-flight temp files; never a valid blob name
pub const TEMP_PREFIX: &str = ".upload-";

/// Longest storage id accepted from callers
pub const MAX_STORAGE_ID_LEN: usize = 128;

/// Attempts at finding an unused storage id before giving up
pub const STORAGE_ID_ATTEMPTS: usize = 4;

/// Default catalog snapshot name inside the storage root
pub const DEFAULT_CATALOG_FILE: &str = "metadata.json";

/// Default SQLite catalog name inside the storage root
pub const DEFAULT_SQLITE_FILE: &str = "catalog.db";

/// Default storage root
pub const DEFAULT_STORAGE_ROOT: &str = "uploads";

/// Default secret store
pub const DEFAULT_SECRET_FILE: &str = ".env";

/// Default config path, overridable with `EOS_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "archive.toml";

/// Timestamp rendering used by listings
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
