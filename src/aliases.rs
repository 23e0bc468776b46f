// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret types used throughout encrypted-object-store.

pub use secure_gate::{fixed_alias, SecureRandomExt};

// 256-bit AES key owned by the KeyProvider for the lifetime of the process
fixed_alias!(ArchiveKey32, 32);
