//! `keygate-core` — Biometric-gated secret storage core for KEYGATE.
//!
//! Encrypt a sensitive token once, bind its decryption to a biometric
//! presence check, and recover the plaintext only after a successful
//! verification. This crate is the audit target: zero database, zero
//! UI, zero network dependencies.
//!
//! # Flow
//!
//! ```text
//! CipherFactory ──► UnauthorizedCipher ──► AuthorizationBridge ──► engine
//!      │                                        │                    │
//!  KeyProvider                         BiometricAuthenticator   CiphertextWrapper
//!      │                                    (external)               │
//!  SecureKeystore                                               WrapperStore
//!   (external)                                                (keygate-store)
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod keystore;

pub mod provider;

pub mod cipher;

pub mod engine;

pub mod wrapper;

pub mod bridge;

pub use bridge::{
    AuthorizationBridge, BiometricAuthenticator, BiometricCapability, FixedOutcomeAuthenticator,
    NullAuthenticator, PromptOptions, PromptRequest, PromptVerdict,
};
pub use cipher::{AuthorizedCipher, CipherFactory, CipherMode, UnauthorizedCipher, IV_LEN, TAG_LEN};
pub use engine::{decrypt, encrypt};
pub use error::{SecretStoreError, UnavailableReason};
pub use keystore::{
    KeyAlgorithm, KeyHandle, KeySpec, SecureKeystore, SoftwareKeystore, KEY_LEN,
};
pub use memory::{SecretBuffer, SecretBytes};
pub use provider::KeyProvider;
pub use wrapper::CiphertextWrapper;
