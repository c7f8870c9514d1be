//! ChaCha20-Poly1305 Encryptor/Decryptor.
//!
//! # Format
//! `[Nonce (12)] [Ciphertext || Tag (16)]`
//!
//! The nonce is drawn from the OS RNG for every call, so encrypting the same
//! plaintext twice yields different ciphertexts.

use alloc::vec::Vec;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use core::fmt;
use rand_core::{OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{CryptoError, Decryptor, Encryptor};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Authenticated symmetric cipher over a 32-byte key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AeadCipher {
    key: [u8; 32],
}

impl fmt::Debug for AeadCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadCipher")
            .field("key", &"***SENSITIVE***")
            .finish()
    }
}

impl AeadCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}

impl Encryptor for AeadCipher {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let sealed = Aead::encrypt(&self.cipher(), Nonce::from_slice(&nonce), data)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }
}

impl Decryptor for AeadCipher {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::DecryptionFailed);
        }
        let (nonce, sealed) = data.split_at(NONCE_LEN);
        Aead::decrypt(&self.cipher(), Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}
