//! Cipher Factory — single-use cipher instances bound to one key.
//!
//! A cipher instance passes through three stages:
//!
//! ```text
//! CipherFactory ──► UnauthorizedCipher ──► AuthorizedCipher ──► consumed
//!                      (no transform         (bridge only)       (engine,
//!                       possible)                                 exactly once)
//! ```
//!
//! The factory prepares a cipher; it never performs a transform. Only
//! the authorization bridge can turn an [`UnauthorizedCipher`] into an
//! [`AuthorizedCipher`], so no caller can skip the biometric handshake.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::SecretStoreError;
use crate::keystore::KeyHandle;
use crate::provider::KeyProvider;

/// AES-256-GCM IV length in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Direction of the pending transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// Seal a plaintext; IV is drawn fresh at authorization.
    Encrypt,
    /// Open a wrapper; IV must be the one captured at encryption.
    Decrypt,
}

// ---------------------------------------------------------------------------
// Unauthorized cipher
// ---------------------------------------------------------------------------

/// A prepared cipher that has not yet passed the biometric gate.
///
/// Holds everything the transform will need except authorization.
/// Dropping it (prompt canceled, rejected) discards nothing but the
/// key handle reference — no partial key material, no IV on the
/// encrypt path.
#[derive(Debug)]
pub struct UnauthorizedCipher {
    key: KeyHandle,
    mode: CipherMode,
    iv: Option<[u8; IV_LEN]>,
}

impl UnauthorizedCipher {
    /// The alias of the key this cipher is bound to.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.key.alias()
    }

    /// The transform direction this cipher was prepared for.
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Cross the biometric gate. Bridge-only: callers never mint an
    /// authorized cipher themselves.
    ///
    /// On the encrypt path this is where the fresh random IV is drawn,
    /// so a canceled prompt leaves no IV behind.
    pub(crate) fn into_authorized(self) -> Result<AuthorizedCipher, SecretStoreError> {
        let iv = match self.iv {
            Some(iv) => iv,
            None => {
                let mut iv = [0u8; IV_LEN];
                OsRng.try_fill_bytes(&mut iv).map_err(|e| {
                    SecretStoreError::Encryption(format!("CSPRNG fill failed: {e}"))
                })?;
                iv
            }
        };
        Ok(AuthorizedCipher {
            core: Some(CipherCore {
                key: self.key,
                mode: self.mode,
                iv,
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// Authorized cipher
// ---------------------------------------------------------------------------

/// Key, mode, and IV of an authorized pending transform.
pub(crate) struct CipherCore {
    pub(crate) key: KeyHandle,
    pub(crate) mode: CipherMode,
    pub(crate) iv: [u8; IV_LEN],
}

/// A cipher that has passed the biometric gate — usable exactly once.
///
/// The first engine call takes the core; a second call on the same
/// instance fails with [`SecretStoreError::CipherConsumed`].
pub struct AuthorizedCipher {
    core: Option<CipherCore>,
}

impl AuthorizedCipher {
    /// Whether this instance has already performed its one transform.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.core.is_none()
    }

    /// Take the core for the one permitted transform.
    pub(crate) fn take_core(&mut self) -> Result<CipherCore, SecretStoreError> {
        self.core.take().ok_or(SecretStoreError::CipherConsumed)
    }
}

impl std::fmt::Debug for AuthorizedCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedCipher")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Produces unauthorized cipher instances from a key provider.
#[derive(Clone, Debug)]
pub struct CipherFactory {
    provider: KeyProvider,
}

impl CipherFactory {
    /// Create a factory over the given key provider.
    #[must_use]
    pub const fn new(provider: KeyProvider) -> Self {
        Self { provider }
    }

    /// Prepare an encrypt-mode cipher for `alias`, provisioning the key
    /// on first use. The IV is drawn at authorization, not here.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::KeyProvisioning`] if the key cannot
    /// be resolved or created.
    pub fn for_encryption(&self, alias: &str) -> Result<UnauthorizedCipher, SecretStoreError> {
        let key = self.provider.get_or_create_key(alias)?;
        Ok(UnauthorizedCipher {
            key,
            mode: CipherMode::Encrypt,
            iv: None,
        })
    }

    /// Prepare a decrypt-mode cipher for `alias` with the IV captured
    /// at encryption time.
    ///
    /// # Errors
    ///
    /// - [`SecretStoreError::KeyNotFound`] if no key was ever enrolled
    ///   for `alias`.
    /// - [`SecretStoreError::InvalidIv`] if `iv` is not exactly
    ///   [`IV_LEN`] bytes.
    pub fn for_decryption(
        &self,
        alias: &str,
        iv: &[u8],
    ) -> Result<UnauthorizedCipher, SecretStoreError> {
        let key = self.provider.existing_key(alias)?;

        if iv.len() != IV_LEN {
            return Err(SecretStoreError::InvalidIv {
                expected: IV_LEN,
                actual: iv.len(),
            });
        }
        let mut iv_bytes = [0u8; IV_LEN];
        iv_bytes.copy_from_slice(iv);

        Ok(UnauthorizedCipher {
            key,
            mode: CipherMode::Decrypt,
            iv: Some(iv_bytes),
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
