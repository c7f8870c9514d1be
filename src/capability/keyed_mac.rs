//! Keyed BLAKE3 Signer/Verifier.
//!
//! A symmetric "signature": the tag is `BLAKE3_Keyed(key, data)`. Anyone holding
//! the key can both sign and verify, so this suits a single trust domain
//! (e.g. a service issuing and later redeeming its own tickets).
//!
//! # Security
//! - **Constant-time check**: tags are compared without data-dependent branches.
//! - **Zeroization**: key material is wiped on drop.

use alloc::vec::Vec;
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{constant_time_eq, CryptoError, Signer, Verifier};

/// Length of a keyed BLAKE3 tag in bytes.
pub const TAG_LEN: usize = 32;

/// Signs and verifies with a shared 32-byte key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyedMacSigner {
    key: [u8; 32],
}

impl fmt::Debug for KeyedMacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMacSigner")
            .field("key", &"***SENSITIVE***")
            .finish()
    }
}

impl KeyedMacSigner {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derives a key from arbitrary-length secret material.
    pub fn derive(context: &str, secret: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(context);
        hasher.update(secret);
        Self { key: hasher.finalize().into() }
    }

    fn tag(&self, data: &[u8]) -> [u8; TAG_LEN] {
        blake3::Hasher::new_keyed(&self.key).update(data).finalize().into()
    }
}

impl Signer for KeyedMacSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.tag(data).to_vec())
    }
}

impl Verifier for KeyedMacSigner {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        Ok(constant_time_eq(&self.tag(data), signature))
    }
}
