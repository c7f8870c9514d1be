//! Cryptographic Capabilities.
//!
//! The acceptance engine never performs cryptography itself. Every sign, verify,
//! encrypt and decrypt step is delegated to a capability supplied by the caller.
//! Each capability is a single fallible byte transform, and any closure with the
//! matching signature can act as one.
//!
//! # Components
//! - `keyed_mac`: Reference `Signer`/`Verifier` built on keyed BLAKE3.
//! - `aead`: Reference `Encryptor`/`Decryptor` built on ChaCha20-Poly1305 (requires `std`).
//!
//! The reference adapters are conveniences for callers and tests. Nothing in the
//! payload or manager layers depends on them.

use alloc::vec::Vec;
use core::fmt;

pub mod keyed_mac;

#[cfg(feature = "std")]
pub mod aead;

/// Errors raised by a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// The signer could not produce a signature.
    SigningFailed,
    /// The verifier could not evaluate the signature (distinct from a mismatch).
    VerificationFailed,
    /// The encryptor rejected the input.
    EncryptionFailed,
    /// The decryptor rejected the input (wrong key, tampered or truncated ciphertext).
    DecryptionFailed,
    /// Key material is unusable.
    InvalidKey,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::SigningFailed => write!(f, "Signing failed"),
            CryptoError::VerificationFailed => write!(f, "Signature verification could not be performed"),
            CryptoError::EncryptionFailed => write!(f, "Encryption failed"),
            CryptoError::DecryptionFailed => write!(f, "Decryption failed"),
            CryptoError::InvalidKey => write!(f, "Invalid key material"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}

/// Produces a signature over a byte string.
pub trait Signer {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Checks a signature against a byte string.
///
/// `Ok(false)` means the signature does not match. `Err` means the check itself
/// could not run.
pub trait Verifier {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;
}

/// Turns plaintext into ciphertext.
pub trait Encryptor {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Turns ciphertext back into plaintext.
pub trait Decryptor {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

impl<F> Signer for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, CryptoError>,
{
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self(data)
    }
}

impl<F> Verifier for F
where
    F: Fn(&[u8], &[u8]) -> Result<bool, CryptoError>,
{
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        self(data, signature)
    }
}

impl<F> Encryptor for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, CryptoError>,
{
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self(data)
    }
}

impl<F> Decryptor for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, CryptoError>,
{
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self(data)
    }
}

/// Constant-time byte comparison used by the reference adapters.
#[inline(never)]
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
