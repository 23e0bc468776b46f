// src/crypto/mod.rs
//! Pure cryptographic operations: no I/O, no catalog
//!
//! All functions work exclusively on in-memory buffers and hold no state
//! between calls, so they are safe to call from any number of threads with a
//! shared `&ArchiveKey32`.
mod decrypt;
mod digest;
mod encrypt;

pub use decrypt::decrypt;
pub use digest::{fingerprint, verify};
pub use encrypt::{encrypt, generate_iv};

use aes::Aes256;

pub(crate) type Aes256CbcEnc = cbc::Encryptor<Aes256>;
pub(crate) type Aes256CbcDec = cbc::Decryptor<Aes256>;
