//! Per-call capabilities for `ExpiringDataManager::accept`.
//!
//! Every capability is optional. Leaving one out changes what is checked, so
//! each omission is spelled out here rather than hidden behind a null check.

use core::fmt;

use crate::capability::{Decryptor, Verifier};

/// Whether `accept` deduplicates submissions.
///
/// With `Verified`, the timestamp proof must verify under the given verifier and
/// an entry already recorded under the same timestamp is rejected. With
/// `Disabled`, identical submissions are all accepted.
#[derive(Clone, Copy, Default)]
pub enum ReplayProtection<'a> {
    #[default]
    Disabled,
    Verified(&'a dyn Verifier),
}

impl<'a> ReplayProtection<'a> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ReplayProtection::Verified(_))
    }

    /// Verifier for the timestamp proof, if any.
    pub fn verifier(&self) -> Option<&'a dyn Verifier> {
        match self {
            ReplayProtection::Verified(verifier) => Some(*verifier),
            ReplayProtection::Disabled => None,
        }
    }
}

impl fmt::Debug for ReplayProtection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayProtection::Disabled => write!(f, "Disabled"),
            ReplayProtection::Verified(_) => write!(f, "Verified"),
        }
    }
}

/// Capabilities handed to a single `accept` call.
#[derive(Clone, Copy, Default)]
pub struct AcceptParams<'a> {
    /// Decrypts the timestamp proof. Required exactly when the proof is encrypted.
    pub decryptor: Option<&'a dyn Decryptor>,
    /// Checks the payload signature. When absent, the payload is not authenticated.
    pub data_verifier: Option<&'a dyn Verifier>,
    /// Timestamp authentication and deduplication.
    pub replay: ReplayProtection<'a>,
}

impl<'a> AcceptParams<'a> {
    /// No decryption, no authentication, no deduplication.
    pub fn new() -> Self {
        Self::default()
    }

    /// One verifier for both the payload and the timestamp proof, with
    /// deduplication enabled.
    pub fn verified_by(verifier: &'a dyn Verifier) -> Self {
        Self {
            decryptor: None,
            data_verifier: Some(verifier),
            replay: ReplayProtection::Verified(verifier),
        }
    }

    pub fn decrypt_with(mut self, decryptor: &'a dyn Decryptor) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    pub fn verify_data_with(mut self, verifier: &'a dyn Verifier) -> Self {
        self.data_verifier = Some(verifier);
        self
    }

    pub fn reject_replays_with(mut self, verifier: &'a dyn Verifier) -> Self {
        self.replay = ReplayProtection::Verified(verifier);
        self
    }
}

impl fmt::Debug for AcceptParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptParams")
            .field("decryptor", &self.decryptor.is_some())
            .field("data_verifier", &self.data_verifier.is_some())
            .field("replay", &self.replay)
            .finish()
    }
}
