#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! End-to-end flow tests: keystore → provider → factory → bridge →
//! engine, exercised the way a host application would drive them.

use std::sync::Arc;

use keygate_core::{
    decrypt, encrypt, AuthorizationBridge, CipherFactory, CiphertextWrapper,
    FixedOutcomeAuthenticator, KeyProvider, PromptOptions, SecretStoreError, SecureKeystore,
    SoftwareKeystore,
};

const ALIAS: &str = "auth-token-secret-key";

/// A full stack over one software keystore and one authenticator.
struct Stack {
    factory: CipherFactory,
    bridge: AuthorizationBridge,
}

fn stack(authenticator: FixedOutcomeAuthenticator) -> Stack {
    let keystore = Arc::new(SoftwareKeystore::new());
    Stack {
        factory: CipherFactory::new(KeyProvider::new(keystore)),
        bridge: AuthorizationBridge::new(Arc::new(authenticator)),
    }
}

/// Enroll: encrypt `secret` under `ALIAS` through the biometric gate.
fn enroll(stack: &Stack, secret: &[u8]) -> Result<CiphertextWrapper, SecretStoreError> {
    let cipher = stack.factory.for_encryption(ALIAS)?;
    stack
        .bridge
        .authorize(cipher, &PromptOptions::default(), |mut authorized| {
            encrypt(&mut authorized, secret)
        })
}

/// Recover: decrypt a previously produced wrapper through the gate.
fn recover(stack: &Stack, wrapper: &CiphertextWrapper) -> Result<Vec<u8>, SecretStoreError> {
    let cipher = stack.factory.for_decryption(ALIAS, &wrapper.iv)?;
    stack
        .bridge
        .authorize(cipher, &PromptOptions::default(), |mut authorized| {
            decrypt(&mut authorized, wrapper).map(|buf| buf.expose().to_vec())
        })
}

// -------------------------------------------------------------------------
// Property 1 — round trip reproduces the plaintext exactly
// -------------------------------------------------------------------------

#[test]
fn enroll_then_recover_reproduces_secret() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let wrapper = enroll(&stack, b"server-issued auth token").expect("enroll");
    let recovered = recover(&stack, &wrapper).expect("recover");
    assert_eq!(recovered, b"server-issued auth token");
}

#[test]
fn roundtrip_survives_wire_codec() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let wrapper = enroll(&stack, b"token with codec hop").expect("enroll");

    let bytes = wrapper.to_bytes();
    let restored = CiphertextWrapper::from_bytes(&bytes).expect("from_bytes");
    let recovered = recover(&stack, &restored).expect("recover");
    assert_eq!(recovered, b"token with codec hop");
}

// -------------------------------------------------------------------------
// Property 2 — IV freshness
// -------------------------------------------------------------------------

#[test]
fn repeated_enrollment_yields_fresh_ivs_and_ciphertext() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let first = enroll(&stack, b"identical plaintext").expect("first enroll");
    let second = enroll(&stack, b"identical plaintext").expect("second enroll");
    assert_ne!(first.iv, second.iv);
    assert_ne!(first.ciphertext, second.ciphertext);

    // Both remain independently decryptable.
    assert_eq!(recover(&stack, &first).expect("first"), b"identical plaintext");
    assert_eq!(recover(&stack, &second).expect("second"), b"identical plaintext");
}

// -------------------------------------------------------------------------
// Property 4 — idempotent key provisioning
// -------------------------------------------------------------------------

#[test]
fn key_survives_repeated_provisioning() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let wrapper = enroll(&stack, b"first enrollment").expect("enroll");

    // A second encrypt re-resolves the key; the first wrapper must
    // still decrypt, proving no silent key regeneration.
    enroll(&stack, b"second enrollment").expect("re-enroll");
    let recovered = recover(&stack, &wrapper).expect("recover");
    assert_eq!(recovered, b"first enrollment");
}

// -------------------------------------------------------------------------
// Property 6 — single-use cipher
// -------------------------------------------------------------------------

#[test]
fn authorized_cipher_is_single_use() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let cipher = stack.factory.for_encryption(ALIAS).expect("prepare");

    let result = stack
        .bridge
        .authorize(cipher, &PromptOptions::default(), |mut authorized| {
            encrypt(&mut authorized, b"first")?;
            // Same instance, second transform.
            encrypt(&mut authorized, b"second")
        });
    assert!(matches!(result, Err(SecretStoreError::CipherConsumed)));
}

// -------------------------------------------------------------------------
// Property 7 — cancellation leaves no partial state
// -------------------------------------------------------------------------

#[test]
fn canceled_decrypt_leaves_keystore_untouched() {
    let keystore: Arc<dyn SecureKeystore> = Arc::new(SoftwareKeystore::new());
    let factory = CipherFactory::new(KeyProvider::new(Arc::clone(&keystore)));
    let approving = AuthorizationBridge::new(Arc::new(FixedOutcomeAuthenticator::approving()));
    let canceling = AuthorizationBridge::new(Arc::new(FixedOutcomeAuthenticator::canceling()));

    let cipher = factory.for_encryption(ALIAS).expect("prepare");
    let wrapper = approving
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            encrypt(&mut c, b"token")
        })
        .expect("enroll");

    let cipher = factory.for_decryption(ALIAS, &wrapper.iv).expect("prepare");
    let result = canceling.authorize(cipher, &PromptOptions::default(), |mut c| {
        decrypt(&mut c, &wrapper)
    });
    assert!(matches!(
        result,
        Err(SecretStoreError::AuthenticationCanceled)
    ));

    // The original enrollment is still intact and recoverable.
    let cipher = factory.for_decryption(ALIAS, &wrapper.iv).expect("prepare");
    let recovered = approving
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            decrypt(&mut c, &wrapper).map(|buf| buf.expose().to_vec())
        })
        .expect("recover");
    assert_eq!(recovered, b"token");
}

#[test]
fn canceled_enrollment_produces_no_wrapper() {
    let stack = stack(FixedOutcomeAuthenticator::canceling());
    let result = enroll(&stack, b"never stored");
    assert!(matches!(
        result,
        Err(SecretStoreError::AuthenticationCanceled)
    ));
}

// -------------------------------------------------------------------------
// Failure routing
// -------------------------------------------------------------------------

#[test]
fn rejected_prompt_surfaces_authentication_failed() {
    let stack = stack(FixedOutcomeAuthenticator::rejecting());
    let result = enroll(&stack, b"token");
    assert!(matches!(result, Err(SecretStoreError::AuthenticationFailed)));
}

#[test]
fn decrypt_before_any_enrollment_reports_key_not_found() {
    let stack = stack(FixedOutcomeAuthenticator::approving());
    let result = stack.factory.for_decryption(ALIAS, &[0u8; 12]);
    assert!(matches!(result, Err(SecretStoreError::KeyNotFound(_))));
}
