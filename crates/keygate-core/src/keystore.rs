//! Secure keystore capability — alias-addressed symmetric keys.
//!
//! The keystore is an external collaborator: the core only ever asks it
//! for an opaque [`KeyHandle`] by alias, never for raw bytes. Platform
//! implementations should back the trait with the OS keystore:
//! - Android: Android Keystore with hardware-backed AES keys
//! - iOS/macOS: Keychain Services with biometric access control
//! - Windows: Windows Hello / TPM-backed keys
//!
//! [`SoftwareKeystore`] is the in-process reference implementation,
//! used in tests and on platforms without a hardware keystore.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::SecretStoreError;
use crate::memory::SecretBytes;

/// Symmetric key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Key specification
// ---------------------------------------------------------------------------

/// Block-cipher algorithm for a provisioned key.
///
/// Only AES-256-GCM is supported: an authenticated mode with a
/// mandatory per-message IV, so tampering is always detected and
/// identical plaintexts never produce identical ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// AES-256 in Galois/Counter Mode.
    Aes256Gcm,
}

/// Parameters a key must be provisioned with.
///
/// The mandatory spec for this core requires a fresh biometric
/// authentication for every single use: `require_user_authentication`
/// set with a zero-second validity window (no once-per-unlock grace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    /// Block cipher and mode.
    pub algorithm: KeyAlgorithm,
    /// Whether every use of the key must be preceded by a user
    /// authentication event.
    pub require_user_authentication: bool,
    /// Seconds a single authentication remains valid for key use.
    /// Zero means every use demands a fresh authentication.
    pub auth_validity_seconds: u32,
}

impl KeySpec {
    /// The only spec this core provisions keys with.
    #[must_use]
    pub const fn per_use_biometric() -> Self {
        Self {
            algorithm: KeyAlgorithm::Aes256Gcm,
            require_user_authentication: true,
            auth_validity_seconds: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Key handle
// ---------------------------------------------------------------------------

/// Opaque handle to a provisioned symmetric key.
///
/// The handle names the key (alias + spec); the material itself lives
/// in zeroizing shared memory and is only ever read by the AEAD
/// primitive inside this crate. Hardware-backed [`SecureKeystore`]
/// implementations construct handles from their own secure storage via
/// [`KeyHandle::new`].
#[derive(Clone)]
pub struct KeyHandle {
    alias: String,
    spec: KeySpec,
    material: Arc<SecretBytes<KEY_LEN>>,
}

impl KeyHandle {
    /// Construct a handle from keystore-owned material.
    #[must_use]
    pub fn new(alias: impl Into<String>, spec: KeySpec, material: SecretBytes<KEY_LEN>) -> Self {
        Self {
            alias: alias.into(),
            spec,
            material: Arc::new(material),
        }
    }

    /// The alias this key was provisioned under.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The parameters the key was provisioned with.
    #[must_use]
    pub const fn spec(&self) -> &KeySpec {
        &self.spec
    }

    /// Key material for the AEAD primitive. Crate-private: the core
    /// never exposes raw key bytes to callers.
    pub(crate) fn material(&self) -> &SecretBytes<KEY_LEN> {
        &self.material
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("alias", &self.alias)
            .field("spec", &self.spec)
            .field("material", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Keystore trait
// ---------------------------------------------------------------------------

/// Alias-addressed secure key storage.
///
/// Implementations own the key material and its durability (the OS
/// keystore persists keys across process restarts). The core never
/// deletes keys — administrative deletion is outside its scope.
pub trait SecureKeystore: Send + Sync {
    /// Generate and durably store a new key under `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::KeyProvisioning`] if a key already
    /// exists under `alias`, if the spec is rejected, or if the backing
    /// store is unavailable. Never silently replaces an existing key.
    fn generate_key(&self, alias: &str, spec: &KeySpec) -> Result<KeyHandle, SecretStoreError>;

    /// Look up the key stored under `alias`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::KeyProvisioning`] if the backing
    /// store cannot be queried. Absence is `Ok(None)`, not an error.
    fn get_key(&self, alias: &str) -> Result<Option<KeyHandle>, SecretStoreError>;
}

// ---------------------------------------------------------------------------
// Software keystore (reference implementation)
// ---------------------------------------------------------------------------

/// In-process keystore holding key material in zeroizing memory.
///
/// Reference implementation for tests and for platforms without a
/// hardware keystore. Keys live only as long as the process; the
/// interior lock belongs to this collaborator, not the core.
#[derive(Default)]
pub struct SoftwareKeystore {
    keys: RwLock<HashMap<String, KeyHandle>>,
}

impl SoftwareKeystore {
    /// Create an empty keystore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for SoftwareKeystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SoftwareKeystore(***)")
    }
}

impl SecureKeystore for SoftwareKeystore {
    fn generate_key(&self, alias: &str, spec: &KeySpec) -> Result<KeyHandle, SecretStoreError> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| SecretStoreError::KeyProvisioning("keystore lock poisoned".into()))?;

        if keys.contains_key(alias) {
            return Err(SecretStoreError::KeyProvisioning(format!(
                "key already exists for alias: {alias}"
            )));
        }

        let material = SecretBytes::<KEY_LEN>::random()
            .map_err(|e| SecretStoreError::KeyProvisioning(format!("key generation failed: {e}")))?;
        let handle = KeyHandle::new(alias, *spec, material);
        keys.insert(alias.to_owned(), handle.clone());
        Ok(handle)
    }

    fn get_key(&self, alias: &str) -> Result<Option<KeyHandle>, SecretStoreError> {
        let keys = self
            .keys
            .read()
            .map_err(|_| SecretStoreError::KeyProvisioning("keystore lock poisoned".into()))?;
        Ok(keys.get(alias).cloned())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
