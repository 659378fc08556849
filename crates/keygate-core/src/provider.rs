//! Key Provider — idempotent per-alias key provisioning.
//!
//! The only place new cryptographic key material is ever created.
//! Provisioning is lazy: the first encryption request for an alias
//! generates the key; later requests return the existing handle.

use std::sync::Arc;

use crate::error::SecretStoreError;
use crate::keystore::{KeyHandle, KeySpec, SecureKeystore};

/// Resolves aliases to key handles, provisioning on first use.
///
/// Holds the keystore capability; one provider may serve any number of
/// aliases (one alias per logical secret).
#[derive(Clone)]
pub struct KeyProvider {
    keystore: Arc<dyn SecureKeystore>,
}

impl KeyProvider {
    /// Create a provider over the given keystore capability.
    #[must_use]
    pub fn new(keystore: Arc<dyn SecureKeystore>) -> Self {
        Self { keystore }
    }

    /// Return the key for `alias`, generating it on first call.
    ///
    /// New keys are provisioned with the mandatory spec: AES-256-GCM,
    /// per-use user authentication, zero-second validity window. An
    /// existing key is reused only if its stored spec matches.
    ///
    /// # Errors
    ///
    /// - [`SecretStoreError::KeyProvisioning`] for an empty alias, a
    ///   keystore failure, or an existing key with incompatible
    ///   parameters.
    pub fn get_or_create_key(&self, alias: &str) -> Result<KeyHandle, SecretStoreError> {
        if alias.is_empty() {
            return Err(SecretStoreError::KeyProvisioning(
                "alias must be a non-empty string".into(),
            ));
        }

        let spec = KeySpec::per_use_biometric();
        if let Some(existing) = self.keystore.get_key(alias)? {
            if *existing.spec() != spec {
                return Err(SecretStoreError::KeyProvisioning(format!(
                    "existing key for alias {alias} has incompatible parameters"
                )));
            }
            return Ok(existing);
        }

        self.keystore.generate_key(alias, &spec)
    }

    /// Return the key for `alias` without ever provisioning.
    ///
    /// Decrypt-path lookup: enrollment must already have happened.
    ///
    /// # Errors
    ///
    /// - [`SecretStoreError::KeyNotFound`] if no key exists for `alias`.
    /// - [`SecretStoreError::KeyProvisioning`] if the keystore cannot
    ///   be queried.
    pub fn existing_key(&self, alias: &str) -> Result<KeyHandle, SecretStoreError> {
        self.keystore
            .get_key(alias)?
            .ok_or_else(|| SecretStoreError::KeyNotFound(alias.to_owned()))
    }
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyProvider")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::SoftwareKeystore;

    fn provider() -> KeyProvider {
        KeyProvider::new(Arc::new(SoftwareKeystore::new()))
    }

    #[test]
    fn first_call_provisions_key() {
        let provider = provider();
        let handle = provider.get_or_create_key("auth-token").expect("provision");
        assert_eq!(handle.alias(), "auth-token");
        assert!(handle.spec().require_user_authentication);
    }

    #[test]
    fn second_call_reuses_key() {
        let provider = provider();
        let first = provider.get_or_create_key("auth-token").expect("first");
        let second = provider.get_or_create_key("auth-token").expect("second");
        assert_eq!(
            first.material().expose(),
            second.material().expose(),
            "re-provisioning must reuse, never regenerate"
        );
    }

    #[test]
    fn empty_alias_is_rejected() {
        let provider = provider();
        let result = provider.get_or_create_key("");
        assert!(matches!(result, Err(SecretStoreError::KeyProvisioning(_))));
    }

    #[test]
    fn existing_key_fails_before_enrollment() {
        let provider = provider();
        let result = provider.existing_key("never-enrolled");
        assert!(
            matches!(result, Err(SecretStoreError::KeyNotFound(alias)) if alias == "never-enrolled")
        );
    }

    #[test]
    fn existing_key_succeeds_after_enrollment() {
        let provider = provider();
        let created = provider.get_or_create_key("auth-token").expect("provision");
        let found = provider.existing_key("auth-token").expect("lookup");
        assert_eq!(created.material().expose(), found.material().expose());
    }
}
