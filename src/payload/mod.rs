//! Payload Primitives.
//!
//! A single tagged type, `SecureData`, carries an opaque byte payload plus the
//! optional attachments that give it meaning:
//!
//! | attachment            | view                        |
//! |-----------------------|-----------------------------|
//! | `ciphertext == true`  | encrypted data              |
//! | `signature`           | trusted (signed) data       |
//! | both, signed over ct  | verified encrypted data     |
//! | `timestamp`           | expiring trusted data       |
//!
//! This layer never performs cryptography. It keeps the bytes in order and hands
//! them to the capabilities the caller supplies. Capability failures propagate
//! unchanged as `PayloadError::Crypto`.
//!
//! # Components
//! - `secure_data`: The payload type, its constructors and sign/verify/decrypt delegation.
//! - `timestamp`: `TimestampProof`, the signed (optionally encrypted) epoch claim.
//! - `expiring`: Timestamp creation, resolution and the expiry predicate.
//!
//! # Security
//! - **Zeroization**: Payload, signature and timestamp buffers are wiped on drop.
//! - **Encrypt-then-sign**: Signatures over encrypted content always cover the ciphertext.

pub mod expiring;
pub mod secure_data;
pub mod timestamp;

use core::fmt;

use crate::capability::CryptoError;
pub use secure_data::SecureData;
pub use timestamp::TimestampProof;

/// Errors related to payload handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// A verifying constructor was handed a signature that does not verify.
    ConstructionFault,
    /// The stored signature does not verify, or none is attached.
    SignatureMismatch,
    /// No timestamp proof is attached.
    MissingTimestamp,
    /// The timestamp is encrypted but no decryptor was supplied.
    DecryptorRequired,
    /// The timestamp is plaintext but a decryptor was supplied.
    UnexpectedDecryptor,
    /// The timestamp bytes do not decode to an epoch value.
    MalformedTimestamp,
    /// A capability failed.
    Crypto(CryptoError),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::ConstructionFault => write!(f, "Initial signature does not verify"),
            PayloadError::SignatureMismatch => write!(f, "Stored signature does not verify"),
            PayloadError::MissingTimestamp => write!(f, "No timestamp attached"),
            PayloadError::DecryptorRequired => write!(f, "Timestamp is encrypted; a decryptor is required"),
            PayloadError::UnexpectedDecryptor => write!(f, "Timestamp is not encrypted; no decryptor expected"),
            PayloadError::MalformedTimestamp => write!(f, "Timestamp bytes are malformed"),
            PayloadError::Crypto(e) => write!(f, "Capability failure: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PayloadError::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CryptoError> for PayloadError {
    fn from(e: CryptoError) -> Self {
        PayloadError::Crypto(e)
    }
}

/// Abbreviated hex rendering for `Debug` output.
pub(crate) fn hex_preview(bytes: &[u8]) -> alloc::string::String {
    const PREVIEW: usize = 8;
    if bytes.len() <= PREVIEW {
        hex::encode(bytes)
    } else {
        alloc::format!("{}..({} bytes)", hex::encode(&bytes[..PREVIEW]), bytes.len())
    }
}
