// src/error.rs
//! Public error type for the entire crate

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Why a ciphertext blob could not be turned back into plaintext
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Blob is shorter than the embedded IV
    TooShort { len: usize },
    /// Body after the IV is empty or not a whole number of blocks
    NotBlockAligned { len: usize },
    /// PKCS#7 padding did not survive decryption (corruption or wrong key)
    BadPadding,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "blob of {len} bytes is shorter than the IV"),
            Self::NotBlockAligned { len } => {
                write!(f, "ciphertext body of {len} bytes is not block aligned")
            }
            Self::BadPadding => f.write_str("invalid padding"),
        }
    }
}

/// What was wrong with the persisted key entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMaterialProblem {
    MissingEntry,
    NotHex,
    WrongLength { len: usize },
}

impl fmt::Display for KeyMaterialProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry => f.write_str("key entry is missing"),
            Self::NotHex => f.write_str("key entry is not valid hex"),
            Self::WrongLength { len } => write!(f, "key entry decodes to {len} bytes, expected 32"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key material invalid: {0}")]
    KeyMaterialInvalid(KeyMaterialProblem),

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(MalformedReason),

    #[error("Decryption failed for {storage_id}: {reason}")]
    DecryptionFailed {
        storage_id: String,
        reason: MalformedReason,
    },

    #[error("Integrity check failed for {storage_id}")]
    IntegrityCheckFailed { storage_id: String },

    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    #[error("Blob already exists: {0}")]
    BlobExists(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Catalog snapshot is corrupt: {0}")]
    CatalogCorrupt(String),

    #[error("Invalid storage id: {0:?}")]
    InvalidStorageId(String),
}

impl CoreError {
    /// Fixed message for the presentation layer. Never carries inner error text.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RecordNotFound(_) => "File metadata missing.",
            Self::BlobNotFound(_) => "File not found on disk.",
            Self::MalformedCiphertext(_) | Self::DecryptionFailed { .. } => {
                "Error reading or decrypting file."
            }
            Self::IntegrityCheckFailed { .. } => "File integrity check failed!",
            Self::InvalidStorageId(_) => "Invalid file reference.",
            Self::CatalogCorrupt(_) => "File index is unreadable.",
            Self::KeyMaterialInvalid(_) => "Encryption key is unavailable.",
            Self::BlobExists(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Sql(_)
            | Self::Config(_) => "Storage error, please try again.",
        }
    }
}
