// src/crypto/decrypt.rs
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

use super::Aes256CbcDec;
use crate::aliases::ArchiveKey32;
use crate::consts::{BLOCK_LEN, IV_LEN};
use crate::error::{CoreError, MalformedReason, Result};

/// Decrypt `iv ++ ciphertext` → plaintext (in-memory)
///
/// Framing is checked before any cipher work. A padding failure means the
/// blob was corrupted or sealed under another key; both surface as
/// [`MalformedReason::BadPadding`].
pub fn decrypt(key: &ArchiveKey32, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < IV_LEN {
        return Err(CoreError::MalformedCiphertext(MalformedReason::TooShort {
            len: blob.len(),
        }));
    }

    let (iv_bytes, body) = blob.split_at(IV_LEN);
    if body.is_empty() || body.len() % BLOCK_LEN != 0 {
        return Err(CoreError::MalformedCiphertext(
            MalformedReason::NotBlockAligned { len: body.len() },
        ));
    }

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);

    Aes256CbcDec::new(key.expose_secret().into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| CoreError::MalformedCiphertext(MalformedReason::BadPadding))
}
