//! Authenticated Encryption Engine — AES-256-GCM over authorized ciphers.
//!
//! This module performs the actual transform. It only accepts an
//! [`AuthorizedCipher`] — the outcome of the biometric handshake — and
//! never triggers authentication itself. Each cipher instance is good
//! for exactly one call.

use ring::aead;
use zeroize::Zeroize;

use crate::cipher::{AuthorizedCipher, CipherCore, CipherMode, TAG_LEN};
use crate::error::SecretStoreError;
use crate::memory::SecretBuffer;
use crate::wrapper::CiphertextWrapper;

/// Build the one-shot AEAD key for a transform.
fn aead_key(core: &CipherCore) -> Result<aead::LessSafeKey, SecretStoreError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, core.key.material().expose())
        .map_err(|_| SecretStoreError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` with an authorized encrypt-mode cipher.
///
/// Returns a [`CiphertextWrapper`] carrying `ct || tag` and the IV the
/// cipher drew at authorization. The IV is fresh per cipher, so
/// encrypting identical plaintext twice yields different wrappers —
/// required, not incidental.
///
/// # Errors
///
/// - [`SecretStoreError::CipherConsumed`] if this instance already
///   performed a transform.
/// - [`SecretStoreError::Encryption`] for a decrypt-mode cipher or a
///   primitive failure.
pub fn encrypt(
    cipher: &mut AuthorizedCipher,
    plaintext: &[u8],
) -> Result<CiphertextWrapper, SecretStoreError> {
    let core = cipher.take_core()?;
    if core.mode != CipherMode::Encrypt {
        return Err(SecretStoreError::Encryption(
            "encrypt called with a decrypt-mode cipher".into(),
        ));
    }

    let key = aead_key(&core)?;
    let nonce = aead::Nonce::assume_unique_for_key(core.iv);

    // Encrypt in place — plaintext buffer becomes ciphertext.
    let mut in_out = plaintext.to_vec();
    let Ok(tag) = key.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out) else {
        in_out.zeroize();
        return Err(SecretStoreError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };
    in_out.extend_from_slice(tag.as_ref());

    Ok(CiphertextWrapper {
        ciphertext: in_out,
        iv: core.iv,
    })
}

/// Decrypt a wrapper with an authorized decrypt-mode cipher.
///
/// The cipher must have been constructed with the wrapper's IV; the
/// transform uses the cipher's IV, so any mismatch surfaces as a tag
/// failure. Recovered plaintext is returned in a zeroizing
/// [`SecretBuffer`].
///
/// # Errors
///
/// - [`SecretStoreError::CipherConsumed`] if this instance already
///   performed a transform.
/// - [`SecretStoreError::Encryption`] for an encrypt-mode cipher or a
///   primitive failure.
/// - [`SecretStoreError::Codec`] if the ciphertext is shorter than one
///   authentication tag.
/// - [`SecretStoreError::IntegrityCheckFailed`] if tag verification
///   fails — tampered ciphertext, wrong key, or wrong IV.
pub fn decrypt(
    cipher: &mut AuthorizedCipher,
    wrapper: &CiphertextWrapper,
) -> Result<SecretBuffer, SecretStoreError> {
    let core = cipher.take_core()?;
    if core.mode != CipherMode::Decrypt {
        return Err(SecretStoreError::Encryption(
            "decrypt called with an encrypt-mode cipher".into(),
        ));
    }
    if wrapper.ciphertext.len() < TAG_LEN {
        return Err(SecretStoreError::Codec(format!(
            "ciphertext shorter than authentication tag: {} bytes",
            wrapper.ciphertext.len()
        )));
    }

    let key = aead_key(&core)?;
    let nonce = aead::Nonce::assume_unique_for_key(core.iv);

    let mut ct_tag = wrapper.ciphertext.clone();
    let plaintext_slice = key
        .open_in_place(nonce, aead::Aad::empty(), &mut ct_tag)
        .map_err(|_| SecretStoreError::IntegrityCheckFailed)?;

    let result = SecretBuffer::new(plaintext_slice);
    ct_tag.zeroize();
    Ok(result)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
