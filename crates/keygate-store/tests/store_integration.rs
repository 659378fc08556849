#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for the wrapper store — on-disk persistence,
//! absent-record contract, and end-to-end tamper detection through
//! the core transform.

use std::sync::Arc;

use keygate_core::{
    decrypt, encrypt, AuthorizationBridge, CipherFactory, FixedOutcomeAuthenticator, KeyProvider,
    PromptOptions, SecretStoreError, SoftwareKeystore,
};
use keygate_store::{delete, load, persist, StoreDb, StoreError};

const NAMESPACE: &str = "app_shared_preference";
const RECORD_KEY: &str = "ciphertext_wrapper";
const ALIAS: &str = "auth-token-secret-key";

fn stack() -> (CipherFactory, AuthorizationBridge) {
    let factory = CipherFactory::new(KeyProvider::new(Arc::new(SoftwareKeystore::new())));
    let bridge = AuthorizationBridge::new(Arc::new(FixedOutcomeAuthenticator::approving()));
    (factory, bridge)
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.db");
    let (factory, bridge) = stack();

    let cipher = factory.for_encryption(ALIAS).expect("prepare");
    let wrapper = bridge
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            encrypt(&mut c, b"persisted token")
        })
        .expect("encrypt");

    {
        let db = StoreDb::open(&path).expect("open");
        persist(&db, NAMESPACE, RECORD_KEY, &wrapper).expect("persist");
    }

    let db = StoreDb::open(&path).expect("re-open");
    let loaded = load(&db, NAMESPACE, RECORD_KEY)
        .expect("load")
        .expect("record should survive reopen");
    assert_eq!(loaded, wrapper);

    // And the reloaded record still decrypts.
    let cipher = factory.for_decryption(ALIAS, &loaded.iv).expect("prepare");
    let recovered = bridge
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            decrypt(&mut c, &loaded).map(|buf| buf.expose().to_vec())
        })
        .expect("decrypt");
    assert_eq!(recovered, b"persisted token");
}

// -------------------------------------------------------------------------
// Property 5 — absent-record contract
// -------------------------------------------------------------------------

#[test]
fn absent_record_is_none_and_gates_decryption() {
    let db = StoreDb::open_in_memory().expect("open");
    let (factory, _bridge) = stack();

    let record = load(&db, NAMESPACE, RECORD_KEY).expect("load");
    let Some(wrapper) = record else {
        // Not yet enrolled — the caller stops here; the decrypt path
        // (which would fail with KeyNotFound anyway) is never reached.
        assert!(matches!(
            factory.for_decryption(ALIAS, &[0u8; 12]),
            Err(SecretStoreError::KeyNotFound(_))
        ));
        return;
    };
    panic!("never-persisted slot returned a record: {wrapper:?}");
}

// -------------------------------------------------------------------------
// Property 3 — tamper detection through the persisted record
// -------------------------------------------------------------------------

#[test]
fn bit_flip_in_persisted_ciphertext_fails_integrity_check() {
    let db = StoreDb::open_in_memory().expect("open");
    let (factory, bridge) = stack();

    let cipher = factory.for_encryption(ALIAS).expect("prepare");
    let wrapper = bridge
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            encrypt(&mut c, b"authentic token")
        })
        .expect("encrypt");
    persist(&db, NAMESPACE, RECORD_KEY, &wrapper).expect("persist");

    // Tamper with the stored ciphertext, keeping the IV.
    let mut tampered = load(&db, NAMESPACE, RECORD_KEY)
        .expect("load")
        .expect("record");
    tampered.ciphertext[3] ^= 0x40;
    persist(&db, NAMESPACE, RECORD_KEY, &tampered).expect("persist tampered");

    let reloaded = load(&db, NAMESPACE, RECORD_KEY)
        .expect("load")
        .expect("record");
    let cipher = factory
        .for_decryption(ALIAS, &reloaded.iv)
        .expect("prepare");
    let result = bridge.authorize(cipher, &PromptOptions::default(), |mut c| {
        decrypt(&mut c, &reloaded)
    });
    assert!(
        matches!(result, Err(SecretStoreError::IntegrityCheckFailed)),
        "tampering must surface as IntegrityCheckFailed, never substitute plaintext"
    );
}

// -------------------------------------------------------------------------
// Re-enrollment overwrites the slot
// -------------------------------------------------------------------------

#[test]
fn re_enrollment_replaces_the_single_slot() {
    let db = StoreDb::open_in_memory().expect("open");
    let (factory, bridge) = stack();

    for secret in [b"first token".as_slice(), b"second token".as_slice()] {
        let cipher = factory.for_encryption(ALIAS).expect("prepare");
        let wrapper = bridge
            .authorize(cipher, &PromptOptions::default(), |mut c| {
                encrypt(&mut c, secret)
            })
            .expect("encrypt");
        persist(&db, NAMESPACE, RECORD_KEY, &wrapper).expect("persist");
    }

    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM wrapper_records", [], |row| row.get(0))
        .expect("count");
    assert_eq!(count, 1, "one slot per (namespace, key)");

    let wrapper = load(&db, NAMESPACE, RECORD_KEY)
        .expect("load")
        .expect("record");
    let cipher = factory.for_decryption(ALIAS, &wrapper.iv).expect("prepare");
    let recovered = bridge
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            decrypt(&mut c, &wrapper).map(|buf| buf.expose().to_vec())
        })
        .expect("decrypt");
    assert_eq!(recovered, b"second token");
}

#[test]
fn delete_clears_enrollment() {
    let db = StoreDb::open_in_memory().expect("open");
    let (factory, bridge) = stack();

    let cipher = factory.for_encryption(ALIAS).expect("prepare");
    let wrapper = bridge
        .authorize(cipher, &PromptOptions::default(), |mut c| {
            encrypt(&mut c, b"token")
        })
        .expect("encrypt");
    persist(&db, NAMESPACE, RECORD_KEY, &wrapper).expect("persist");

    assert!(delete(&db, NAMESPACE, RECORD_KEY).expect("delete"));
    assert!(load(&db, NAMESPACE, RECORD_KEY).expect("load").is_none());
}

#[test]
fn core_error_identity_survives_store_wrapping() {
    // IntegrityCheckFailed keeps its distinct identity through StoreError.
    let err = StoreError::Core(SecretStoreError::IntegrityCheckFailed);
    assert!(err.to_string().contains("integrity check failed"));
}
