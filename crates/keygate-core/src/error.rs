//! Error types for `keygate-core`.

use thiserror::Error;

/// Why biometric authentication cannot currently be performed.
///
/// Mirrors the capability answer from the external authenticator so a
/// caller can route the user to the right fallback (enrollment screen,
/// password flow, retry-later message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No biometric hardware on this device.
    NoHardware,
    /// Hardware exists but no biometrics are enrolled.
    NoneEnrolled,
    /// Hardware busy, locked out after repeated failures, or otherwise
    /// temporarily unable to authenticate.
    TemporarilyUnavailable,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHardware => f.write_str("no biometric hardware"),
            Self::NoneEnrolled => f.write_str("no biometrics enrolled"),
            Self::TemporarilyUnavailable => f.write_str("biometric hardware temporarily unavailable"),
        }
    }
}

/// Errors produced by the secret-storage core.
///
/// Every variant is surfaced to the caller — none is swallowed or
/// retried internally, because each demands a distinct caller-level
/// decision (re-issue the prompt, fall back to password login,
/// re-enroll, or treat as tampering).
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Key generation was rejected, the keystore is unavailable, or an
    /// existing key's parameters are incompatible with the request.
    #[error("key provisioning failed: {0}")]
    KeyProvisioning(String),

    /// No key exists for the alias — the caller must enroll (encrypt)
    /// before ever attempting decryption.
    #[error("no key found for alias: {0}")]
    KeyNotFound(String),

    /// The supplied initialization vector has the wrong length for the
    /// configured mode.
    #[error("invalid IV length: {actual} bytes (expected {expected})")]
    InvalidIv {
        /// Required IV length in bytes.
        expected: usize,
        /// Length of the IV the caller supplied.
        actual: usize,
    },

    /// The authenticator reported a biometric non-match.
    #[error("biometric authentication failed")]
    AuthenticationFailed,

    /// The user dismissed the biometric prompt.
    #[error("biometric authentication canceled by user")]
    AuthenticationCanceled,

    /// Biometric authentication cannot be performed right now.
    #[error("biometric authentication unavailable: {0}")]
    AuthenticationUnavailable(UnavailableReason),

    /// Authentication tag verification failed — ciphertext tampered,
    /// wrong key, or wrong IV. Callers should treat this as a potential
    /// tamper indicator, not a generic I/O failure.
    #[error("integrity check failed: authentication tag mismatch")]
    IntegrityCheckFailed,

    /// The same authorized cipher instance was presented for a second
    /// transform. A fresh cipher must be requested per operation.
    #[error("cipher instance already consumed")]
    CipherConsumed,

    /// Internal primitive failure (key construction, seal operation,
    /// mode misuse).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Wrapper wire-format parsing or serialization failure.
    #[error("wrapper codec error: {0}")]
    Codec(String),
}
