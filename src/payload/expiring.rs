//! Expiring Trusted Data.
//!
//! Binds a payload to an authenticable freshness claim. The claim is a
//! `TimestampProof` signed independently of the payload, so its authenticity can
//! be checked with a different verifier than the data's.
//!
//! `is_expired` is the single predicate for freshness plus authenticity. The
//! manager calls it both when accepting an entry and when reporting the verdict.

use super::{PayloadError, SecureData, TimestampProof};
use crate::capability::{Decryptor, Encryptor, Signer, Verifier};
use crate::freshness::TimeTester;

#[cfg(feature = "std")]
use crate::config::TimeUnit;

impl SecureData {
    /// Stamps the payload with the current system time.
    ///
    /// Calling this again replaces the previous timestamp (refresh).
    #[cfg(feature = "std")]
    pub fn create_timestamp(
        &mut self,
        encryptor: Option<&dyn Encryptor>,
        signer: &dyn Signer,
    ) -> Result<(), PayloadError> {
        use crate::freshness::{Clock, SystemClock};
        self.create_timestamp_at(SystemClock.now_millis(), encryptor, signer)
    }

    /// Stamps the payload with an explicit epoch value in milliseconds.
    pub fn create_timestamp_at(
        &mut self,
        millis: i64,
        encryptor: Option<&dyn Encryptor>,
        signer: &dyn Signer,
    ) -> Result<(), PayloadError> {
        let proof = TimestampProof::issue(millis, encryptor, signer)?;
        self.set_timestamp(Some(proof));
        Ok(())
    }

    /// Resolves the attached timestamp to epoch milliseconds.
    ///
    /// # Errors
    /// * `MissingTimestamp` if no proof is attached.
    /// * Any error of `TimestampProof::millis`.
    pub fn timestamp_millis(&self, decryptor: Option<&dyn Decryptor>) -> Result<i64, PayloadError> {
        self.timestamp()
            .ok_or(PayloadError::MissingTimestamp)?
            .millis(decryptor)
    }

    /// Checks the proof's signature against `verifier`.
    ///
    /// Returns `Ok(false)` when no proof is attached.
    pub fn verify_timestamp(&self, verifier: &dyn Verifier) -> Result<bool, PayloadError> {
        match self.timestamp() {
            Some(proof) => proof.verify(verifier),
            None => Ok(false),
        }
    }

    /// Returns `true` unless the entry carries a readable timestamp inside the
    /// tester's window whose signature (when a verifier is given) verifies.
    ///
    /// Faults are folded into the verdict: an unreadable or unverifiable claim
    /// counts as expired.
    pub fn is_expired(
        &self,
        tester: &TimeTester,
        decryptor: Option<&dyn Decryptor>,
        timestamp_verifier: Option<&dyn Verifier>,
    ) -> bool {
        if let Some(verifier) = timestamp_verifier {
            if !matches!(self.verify_timestamp(verifier), Ok(true)) {
                return true;
            }
        }
        match self.timestamp_millis(decryptor) {
            Ok(millis) => !tester.test(millis),
            Err(_) => true,
        }
    }

    /// `is_expired` against the system clock with an ad-hoc tolerance.
    #[cfg(feature = "std")]
    pub fn is_expired_within(
        &self,
        max_time_error: u64,
        unit: TimeUnit,
        decryptor: Option<&dyn Decryptor>,
        timestamp_verifier: Option<&dyn Verifier>,
    ) -> bool {
        self.is_expired(&TimeTester::system(max_time_error, unit), decryptor, timestamp_verifier)
    }
}
