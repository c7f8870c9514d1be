//! Timestamp Proofs.
//!
//! A proof is the freshness claim attached to an expiring payload. It carries an
//! epoch value in milliseconds, optionally encrypted, and a signature over the
//! bytes as stored.
//!
//! # Format
//! Plaintext encoding: `[Epoch millis (8 bytes, signed, BE)]`.
//! When encrypted, `bytes` holds whatever the encryptor produced for that encoding.
//!
//! # Modes
//! - **Authenticity only**: anyone with the verifier can read the value.
//! - **Confidential**: the value needs the decryptor; the signature still covers
//!   the ciphertext, so authenticity can be checked without decrypting.

use alloc::vec::Vec;
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{hex_preview, PayloadError};
use crate::capability::{Decryptor, Encryptor, Signer, Verifier};

/// Length of the plaintext timestamp encoding.
pub const ENCODED_LEN: usize = 8;

/// A signed, optionally encrypted epoch-millisecond claim.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct TimestampProof {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    encrypted: bool,
    signature: Vec<u8>,
}

impl fmt::Debug for TimestampProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampProof")
            .field("encrypted", &self.encrypted)
            .field("bytes", &hex_preview(&self.bytes))
            .field("signature", &hex_preview(&self.signature))
            .finish()
    }
}

impl TimestampProof {
    /// Encodes `millis`, encrypts it when an encryptor is given, and signs the
    /// stored bytes.
    pub fn issue(
        millis: i64,
        encryptor: Option<&dyn Encryptor>,
        signer: &dyn Signer,
    ) -> Result<Self, PayloadError> {
        let encoded = encode(millis);
        let (bytes, encrypted) = match encryptor {
            Some(encryptor) => (encryptor.encrypt(&encoded)?, true),
            None => (encoded.to_vec(), false),
        };
        let signature = signer.sign(&bytes)?;
        Ok(Self {
            bytes,
            encrypted,
            signature,
        })
    }

    /// Reassembles a proof received from elsewhere. Nothing is checked.
    pub fn from_parts(bytes: Vec<u8>, encrypted: bool, signature: Vec<u8>) -> Self {
        Self {
            bytes,
            encrypted,
            signature,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Checks the proof's own signature over its stored bytes.
    pub fn verify(&self, verifier: &dyn Verifier) -> Result<bool, PayloadError> {
        Ok(verifier.verify(&self.bytes, &self.signature)?)
    }

    /// Resolves the claimed epoch value.
    ///
    /// # Errors
    /// * `DecryptorRequired` / `UnexpectedDecryptor` if `decryptor` does not match
    ///   how the proof was issued.
    /// * `Crypto` if decryption fails.
    /// * `MalformedTimestamp` if the plaintext is not exactly `ENCODED_LEN` bytes.
    pub fn millis(&self, decryptor: Option<&dyn Decryptor>) -> Result<i64, PayloadError> {
        match (self.encrypted, decryptor) {
            (true, Some(decryptor)) => {
                let plain = Zeroizing::new(decryptor.decrypt(&self.bytes)?);
                decode(&plain)
            }
            (true, None) => Err(PayloadError::DecryptorRequired),
            (false, Some(_)) => Err(PayloadError::UnexpectedDecryptor),
            (false, None) => decode(&self.bytes),
        }
    }
}

fn encode(millis: i64) -> [u8; ENCODED_LEN] {
    millis.to_be_bytes()
}

fn decode(bytes: &[u8]) -> Result<i64, PayloadError> {
    let raw: [u8; ENCODED_LEN] = bytes.try_into().map_err(|_| PayloadError::MalformedTimestamp)?;
    Ok(i64::from_be_bytes(raw))
}
