// src/crypto/digest.rs
use sha2::{Digest, Sha256};

/// SHA-256 of `data` as 64 lowercase hex chars
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Recompute the fingerprint of `data` and compare it with a recorded one.
///
/// An empty recorded digest never matches.
pub fn verify(data: &[u8], expected_hex: &str) -> bool {
    !expected_hex.is_empty() && fingerprint(data).eq_ignore_ascii_case(expected_hex)
}
