//! Biometric Authorization Bridge — the gate between a prepared cipher
//! and its one permitted transform.
//!
//! Protocol (per authorization flow):
//!
//! ```text
//! Idle ──► PromptIssued ──► Authorized  (continuation runs, exactly once)
//!                      ├──► Rejected    (AuthenticationFailed)
//!                      ├──► Canceled    (AuthenticationCanceled)
//!                      └──► Error       (AuthenticationUnavailable)
//! ```
//!
//! The bridge pre-checks device capability before issuing a prompt,
//! hands the unauthorized cipher to the external authenticator as the
//! object being unlocked, and on success mints the [`AuthorizedCipher`]
//! itself — authenticator implementations report a verdict, they never
//! touch the conversion. Retry after a failure is a caller decision;
//! the bridge never re-issues a prompt on its own. One flow per caller
//! context at a time: the synchronous API cannot overlap prompts from
//! one caller, and cross-context serialization is the caller's job.

use std::sync::Arc;

use crate::cipher::{AuthorizedCipher, UnauthorizedCipher};
use crate::error::{SecretStoreError, UnavailableReason};

// ---------------------------------------------------------------------------
// Prompt configuration
// ---------------------------------------------------------------------------

/// Display options for the external biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    /// Prompt title.
    pub title: String,
    /// Prompt subtitle.
    pub subtitle: String,
    /// Longer description of why authentication is requested.
    pub description: String,
    /// Whether the user must explicitly confirm after a passive match
    /// (e.g. face recognition).
    pub require_confirmation: bool,
    /// Label of the cancel/negative button.
    pub cancel_label: String,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            title: "Verify identity".into(),
            subtitle: String::new(),
            description: String::new(),
            require_confirmation: false,
            cancel_label: "Cancel".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authenticator interface
// ---------------------------------------------------------------------------

/// Device capability for strong (hardware-backed) biometric
/// authentication. Queried before every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricCapability {
    /// Strong biometric authentication is available and enrolled.
    Available,
    /// No biometric hardware on this device.
    NoHardware,
    /// Hardware exists but nothing is enrolled.
    NoneEnrolled,
    /// Hardware busy or locked out.
    TemporarilyUnavailable,
}

/// What the bridge submits to the external authenticator: the cipher
/// being unlocked and the prompt display options.
#[derive(Debug)]
pub struct PromptRequest<'a> {
    /// The unauthorized cipher the authentication event unlocks.
    pub cipher: &'a UnauthorizedCipher,
    /// How the prompt should be presented.
    pub options: &'a PromptOptions,
}

/// Outcome the external authenticator reports for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVerdict {
    /// Biometric match — the pending cipher may be used.
    Succeeded,
    /// Biometric non-match.
    Failed,
    /// User dismissed the prompt.
    Canceled,
    /// Authentication could not be performed.
    Unavailable(UnavailableReason),
}

/// External biometric authentication subsystem.
///
/// Implementations wrap the platform prompt (fingerprint/face UI) and
/// block the calling flow until the user responds. The core only
/// consumes the verdict; prompt rendering is entirely external.
pub trait BiometricAuthenticator: Send + Sync {
    /// Query whether strong biometric authentication can be performed
    /// right now.
    fn capability(&self) -> BiometricCapability;

    /// Present the prompt for the given request and report the outcome.
    fn issue_prompt(&self, request: &PromptRequest<'_>) -> PromptVerdict;
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Couples an unauthorized cipher to the external authenticator and
/// delivers the authorized cipher to the waiting continuation.
#[derive(Clone)]
pub struct AuthorizationBridge {
    authenticator: Arc<dyn BiometricAuthenticator>,
}

impl AuthorizationBridge {
    /// Create a bridge over the given authenticator.
    #[must_use]
    pub fn new(authenticator: Arc<dyn BiometricAuthenticator>) -> Self {
        Self { authenticator }
    }

    /// Run one authorization flow: capability pre-check, prompt, and on
    /// success the single-fire `on_authorized` continuation with the
    /// now-usable cipher.
    ///
    /// A canceled or rejected prompt discards `cipher` with no partial
    /// state — on the encrypt path not even an IV has been drawn yet.
    ///
    /// # Errors
    ///
    /// - [`SecretStoreError::AuthenticationUnavailable`] if the
    ///   capability pre-check fails (no prompt is issued) or the
    ///   authenticator reports unavailability.
    /// - [`SecretStoreError::AuthenticationFailed`] on a non-match.
    /// - [`SecretStoreError::AuthenticationCanceled`] on dismissal.
    /// - Whatever `on_authorized` itself returns.
    pub fn authorize<T>(
        &self,
        cipher: UnauthorizedCipher,
        options: &PromptOptions,
        on_authorized: impl FnOnce(AuthorizedCipher) -> Result<T, SecretStoreError>,
    ) -> Result<T, SecretStoreError> {
        // Pre-check: skip straight to Unavailable without a prompt.
        match self.authenticator.capability() {
            BiometricCapability::Available => {}
            BiometricCapability::NoHardware => {
                return Err(SecretStoreError::AuthenticationUnavailable(
                    UnavailableReason::NoHardware,
                ));
            }
            BiometricCapability::NoneEnrolled => {
                return Err(SecretStoreError::AuthenticationUnavailable(
                    UnavailableReason::NoneEnrolled,
                ));
            }
            BiometricCapability::TemporarilyUnavailable => {
                return Err(SecretStoreError::AuthenticationUnavailable(
                    UnavailableReason::TemporarilyUnavailable,
                ));
            }
        }

        // Idle → PromptIssued.
        let verdict = self.authenticator.issue_prompt(&PromptRequest {
            cipher: &cipher,
            options,
        });

        match verdict {
            PromptVerdict::Succeeded => on_authorized(cipher.into_authorized()?),
            PromptVerdict::Failed => Err(SecretStoreError::AuthenticationFailed),
            PromptVerdict::Canceled => Err(SecretStoreError::AuthenticationCanceled),
            PromptVerdict::Unavailable(reason) => {
                Err(SecretStoreError::AuthenticationUnavailable(reason))
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthorizationBridge")
    }
}

// ---------------------------------------------------------------------------
// Stock authenticators
// ---------------------------------------------------------------------------

/// Fallback authenticator for devices without biometric hardware —
/// every flow short-circuits to unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuthenticator;

impl BiometricAuthenticator for NullAuthenticator {
    fn capability(&self) -> BiometricCapability {
        BiometricCapability::NoHardware
    }

    fn issue_prompt(&self, _request: &PromptRequest<'_>) -> PromptVerdict {
        PromptVerdict::Unavailable(UnavailableReason::NoHardware)
    }
}

/// Authenticator that reports a fixed verdict for every prompt.
///
/// For tests and development hosts; a real deployment wires a platform
/// prompt implementation instead.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomeAuthenticator {
    verdict: PromptVerdict,
}

impl FixedOutcomeAuthenticator {
    /// Every prompt succeeds.
    #[must_use]
    pub const fn approving() -> Self {
        Self {
            verdict: PromptVerdict::Succeeded,
        }
    }

    /// Every prompt reports a non-match.
    #[must_use]
    pub const fn rejecting() -> Self {
        Self {
            verdict: PromptVerdict::Failed,
        }
    }

    /// Every prompt is dismissed by the user.
    #[must_use]
    pub const fn canceling() -> Self {
        Self {
            verdict: PromptVerdict::Canceled,
        }
    }
}

impl BiometricAuthenticator for FixedOutcomeAuthenticator {
    fn capability(&self) -> BiometricCapability {
        BiometricCapability::Available
    }

    fn issue_prompt(&self, _request: &PromptRequest<'_>) -> PromptVerdict {
        self.verdict
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
