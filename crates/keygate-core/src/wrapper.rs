//! Ciphertext wrapper — the durable {ciphertext, IV} pair.
//!
//! One wrapper represents one encrypted secret. The ciphertext field
//! carries the GCM authentication tag appended (`ct || tag`), exactly
//! as the transform emits it; the IV is the per-encryption random value
//! needed to reconstruct the decrypting cipher.
//!
//! Wire format: `ciphertext length (u32 LE) || ciphertext || iv (12 bytes)`.

use serde::{Deserialize, Serialize};

use crate::cipher::{IV_LEN, TAG_LEN};
use crate::error::SecretStoreError;

/// Byte length of the wire-format length prefix.
const LEN_PREFIX: usize = 4;

/// The {ciphertext, IV} pair produced by one authenticated encryption.
///
/// Only meaningful paired with the key alias it was produced under —
/// decrypting under any other key fails tag verification, never
/// silently returns wrong plaintext.
#[must_use = "a wrapper that is not persisted cannot be decrypted later"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextWrapper {
    /// Authenticated-encryption output: ciphertext with the 128-bit tag
    /// appended.
    pub ciphertext: Vec<u8>,
    /// 96-bit random IV, unique per encryption.
    pub iv: [u8; IV_LEN],
}

impl CiphertextWrapper {
    /// Serialize to wire format: `len(ciphertext) || ciphertext || iv`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = LEN_PREFIX
            .saturating_add(self.ciphertext.len())
            .saturating_add(IV_LEN);
        let mut out = Vec::with_capacity(capacity);
        // Record format caps ciphertext at u32::MAX bytes; a secret that
        // large is outside any realistic use of this store.
        let len = u32::try_from(self.ciphertext.len()).unwrap_or(u32::MAX);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.iv);
        out
    }

    /// Deserialize from wire format.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::Codec`] if the input is truncated,
    /// the declared length disagrees with the actual layout, or the
    /// ciphertext is shorter than one authentication tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecretStoreError> {
        if bytes.len() < LEN_PREFIX {
            return Err(SecretStoreError::Codec(format!(
                "wrapper record too short: {} bytes",
                bytes.len()
            )));
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&bytes[..LEN_PREFIX]);
        let ct_len = u32::from_le_bytes(len_bytes) as usize;

        let expected = LEN_PREFIX
            .checked_add(ct_len)
            .and_then(|n| n.checked_add(IV_LEN))
            .ok_or_else(|| SecretStoreError::Codec("wrapper length overflow".into()))?;
        if bytes.len() != expected {
            return Err(SecretStoreError::Codec(format!(
                "wrapper record has {} bytes, declared layout needs {expected}",
                bytes.len()
            )));
        }
        if ct_len < TAG_LEN {
            return Err(SecretStoreError::Codec(format!(
                "ciphertext shorter than authentication tag: {ct_len} bytes"
            )));
        }

        let ct_end = LEN_PREFIX.saturating_add(ct_len);
        let ciphertext = bytes[LEN_PREFIX..ct_end].to_vec();
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[ct_end..]);

        Ok(Self { ciphertext, iv })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
