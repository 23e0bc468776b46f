// src/crypto/encrypt.rs
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use super::Aes256CbcEnc;
use crate::aliases::ArchiveKey32;
use crate::consts::IV_LEN;

/// Fresh random IV from the thread-local CSPRNG
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext → `iv ++ AES-256-CBC(PKCS#7(plaintext))` (in-memory)
///
/// Every call draws its own IV; callers cannot supply one.
pub fn encrypt(key: &ArchiveKey32, plaintext: &[u8]) -> Vec<u8> {
    let iv = generate_iv();
    let body = Aes256CbcEnc::new(key.expose_secret().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_LEN + body.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&body);
    blob
}
