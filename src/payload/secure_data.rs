//! The flattened payload type.

use alloc::vec::Vec;
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{hex_preview, PayloadError, TimestampProof};
use crate::capability::{Decryptor, Encryptor, Signer, Verifier};

/// An opaque payload with optional ciphertext marker, signature and timestamp.
///
/// Equality is structural over every field, so two submissions are duplicates
/// exactly when their bytes, signature and timestamp proof all match.
/// `Clone` produces an independent deep copy.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct SecureData {
    data: Vec<u8>,
    #[zeroize(skip)]
    ciphertext: bool,
    signature: Option<Vec<u8>>,
    timestamp: Option<TimestampProof>,
}

impl fmt::Debug for SecureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureData")
            .field("length", &self.data.len())
            .field("ciphertext", &self.ciphertext)
            .field("signature", &self.signature.as_deref().map(hex_preview))
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl SecureData {
    /// Wraps plain bytes with no attachments.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ciphertext: false,
            signature: None,
            timestamp: None,
        }
    }

    /// Wraps bytes that are already ciphertext.
    pub fn from_ciphertext(ciphertext: Vec<u8>) -> Self {
        Self {
            data: ciphertext,
            ciphertext: true,
            signature: None,
            timestamp: None,
        }
    }

    /// Encrypts `plaintext` and keeps the ciphertext.
    pub fn encrypted(plaintext: &[u8], encryptor: &dyn Encryptor) -> Result<Self, PayloadError> {
        Ok(Self::from_ciphertext(encryptor.encrypt(plaintext)?))
    }

    /// Attaches a signature without checking it.
    pub fn with_signature(data: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            data,
            ciphertext: false,
            signature: Some(signature),
            timestamp: None,
        }
    }

    /// Signs `data` and keeps the signature.
    pub fn signed(data: Vec<u8>, signer: &dyn Signer) -> Result<Self, PayloadError> {
        let signature = signer.sign(&data)?;
        Ok(Self::with_signature(data, signature))
    }

    /// Attaches a signature and fails fast if it does not verify.
    ///
    /// # Errors
    /// * `PayloadError::ConstructionFault` if the verifier rejects the signature.
    /// * `PayloadError::Crypto` if the verifier itself fails.
    pub fn verified(data: Vec<u8>, signature: Vec<u8>, verifier: &dyn Verifier) -> Result<Self, PayloadError> {
        if !verifier.verify(&data, &signature)? {
            return Err(PayloadError::ConstructionFault);
        }
        Ok(Self::with_signature(data, signature))
    }

    /// Encrypts `plaintext`, then signs the resulting ciphertext.
    pub fn encrypt_then_sign(
        plaintext: &[u8],
        encryptor: &dyn Encryptor,
        signer: &dyn Signer,
    ) -> Result<Self, PayloadError> {
        let mut sealed = Self::encrypted(plaintext, encryptor)?;
        sealed.sign_this(signer)?;
        Ok(sealed)
    }

    /// Decrypts `ciphertext` and checks `signature` against the recovered plaintext.
    ///
    /// The result holds the plaintext, not the ciphertext.
    pub fn decrypt_and_verify(
        ciphertext: &[u8],
        decryptor: &dyn Decryptor,
        signature: Vec<u8>,
        verifier: &dyn Verifier,
    ) -> Result<Self, PayloadError> {
        Self::verified(decryptor.decrypt(ciphertext)?, signature, verifier)
    }

    /// Replaces the timestamp proof, builder style.
    pub fn with_timestamp(mut self, timestamp: Option<TimestampProof>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data.zeroize();
        self.data = data;
    }

    pub fn is_ciphertext(&self) -> bool {
        self.ciphertext
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    pub fn set_signature(&mut self, signature: Option<Vec<u8>>) {
        self.signature = signature;
    }

    pub fn timestamp(&self) -> Option<&TimestampProof> {
        self.timestamp.as_ref()
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    pub fn set_timestamp(&mut self, timestamp: Option<TimestampProof>) {
        self.timestamp = timestamp;
    }

    /// Signs the payload bytes. Nothing is stored.
    pub fn sign(&self, signer: &dyn Signer) -> Result<Vec<u8>, PayloadError> {
        Ok(signer.sign(&self.data)?)
    }

    /// Signs the payload bytes and stores the signature, replacing any previous one.
    pub fn sign_this(&mut self, signer: &dyn Signer) -> Result<(), PayloadError> {
        self.signature = Some(signer.sign(&self.data)?);
        Ok(())
    }

    /// Checks the stored signature against the stored bytes.
    ///
    /// Returns `Ok(false)` when no signature is attached.
    pub fn verify(&self, verifier: &dyn Verifier) -> Result<bool, PayloadError> {
        match &self.signature {
            Some(signature) => Ok(verifier.verify(&self.data, signature)?),
            None => Ok(false),
        }
    }

    /// Checks a signature that is not held by this payload against its bytes.
    pub fn verify_with(&self, verifier: &dyn Verifier, signature: &[u8]) -> Result<bool, PayloadError> {
        Ok(verifier.verify(&self.data, signature)?)
    }

    /// Returns the decrypted payload bytes. `self` is left untouched.
    pub fn decrypt(&self, decryptor: &dyn Decryptor) -> Result<Vec<u8>, PayloadError> {
        Ok(decryptor.decrypt(&self.data)?)
    }

    /// Returns the encrypted payload bytes. `self` is left untouched.
    pub fn encrypt(&self, encryptor: &dyn Encryptor) -> Result<Vec<u8>, PayloadError> {
        Ok(encryptor.encrypt(&self.data)?)
    }

    /// Fails unless the stored signature verifies against the stored bytes.
    ///
    /// # Errors
    /// * `PayloadError::SignatureMismatch` if it does not verify or none is attached.
    /// * `PayloadError::Crypto` if the verifier itself fails.
    pub fn verify_this(&self, verifier: &dyn Verifier) -> Result<(), PayloadError> {
        if !self.verify(verifier)? {
            return Err(PayloadError::SignatureMismatch);
        }
        Ok(())
    }

    /// Encrypted copy of this payload. The timestamp proof is carried over.
    ///
    /// With a signer, the ciphertext is signed afresh. Without one, the existing
    /// signature is kept as is.
    pub fn to_encrypted(&self, encryptor: &dyn Encryptor, signer: Option<&dyn Signer>) -> Result<Self, PayloadError> {
        let data = encryptor.encrypt(&self.data)?;
        let signature = match signer {
            Some(signer) => Some(signer.sign(&data)?),
            None => self.signature.clone(),
        };
        Ok(Self {
            data,
            ciphertext: true,
            signature,
            timestamp: self.timestamp.clone(),
        })
    }

    /// Decrypted copy of this payload. The signature and timestamp proof are carried over.
    ///
    /// With a verifier, the carried signature must verify against the recovered
    /// plaintext, else `PayloadError::ConstructionFault`.
    pub fn to_decrypted(&self, decryptor: &dyn Decryptor, verifier: Option<&dyn Verifier>) -> Result<Self, PayloadError> {
        let plain = Self {
            data: decryptor.decrypt(&self.data)?,
            ciphertext: false,
            signature: self.signature.clone(),
            timestamp: self.timestamp.clone(),
        };
        if let Some(verifier) = verifier {
            if !plain.verify(verifier)? {
                return Err(PayloadError::ConstructionFault);
            }
        }
        Ok(plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CryptoError;
    use crate::payload::test_support::{Broken, MockCipher, MockSigner};

    #[test]
    fn test_signed_round_trip() {
        let signer = MockSigner { key: 3 };
        let data = SecureData::signed(b"hello".to_vec(), &signer).unwrap();

        assert!(data.signature().is_some());
        assert!(data.verify(&signer).unwrap());
        assert!(!data.verify(&MockSigner { key: 4 }).unwrap());
    }

    #[test]
    fn test_sign_is_stateless() {
        let signer = MockSigner { key: 3 };
        let data = SecureData::new(b"hello".to_vec());

        let sig = data.sign(&signer).unwrap();
        assert!(data.signature().is_none());
        assert!(data.verify_with(&signer, &sig).unwrap());
    }

    #[test]
    fn test_verify_without_signature() {
        let data = SecureData::new(b"unsigned".to_vec());
        assert_eq!(data.verify(&MockSigner { key: 1 }), Ok(false));
    }

    #[test]
    fn test_verifying_constructor() {
        let signer = MockSigner { key: 9 };
        let sig = signer.sign(b"payload").unwrap();

        let ok = SecureData::verified(b"payload".to_vec(), sig.clone(), &signer).unwrap();
        assert_eq!(ok.signature(), Some(sig.as_slice()));

        let err = SecureData::verified(b"tampered".to_vec(), sig, &signer);
        assert_eq!(err, Err(PayloadError::ConstructionFault));
    }

    #[test]
    fn test_verifying_constructor_propagates_capability_failure() {
        let err = SecureData::verified(b"payload".to_vec(), alloc::vec![0], &Broken);
        assert_eq!(err, Err(PayloadError::Crypto(CryptoError::VerificationFailed)));
    }

    #[test]
    fn test_encrypt_then_sign_covers_ciphertext() {
        let cipher = MockCipher { key: 0x5A };
        let signer = MockSigner { key: 7 };
        let sealed = SecureData::encrypt_then_sign(b"secret", &cipher, &signer).unwrap();

        assert!(sealed.is_ciphertext());
        assert_ne!(sealed.data(), b"secret");
        // Signature matches the stored ciphertext, not the plaintext
        assert!(sealed.verify(&signer).unwrap());
        let sig = sealed.signature().unwrap().to_vec();
        assert!(!signer.verify(b"secret", &sig).unwrap());

        assert_eq!(sealed.decrypt(&cipher).unwrap(), b"secret".to_vec());
        // Decrypting does not mutate the payload
        assert!(sealed.is_ciphertext());
        assert!(sealed.verify(&signer).unwrap());
    }

    #[test]
    fn test_decrypt_and_verify() {
        let cipher = MockCipher { key: 0x11 };
        let signer = MockSigner { key: 2 };
        let ciphertext = cipher.encrypt(b"plain").unwrap();
        let sig = signer.sign(b"plain").unwrap();

        let opened = SecureData::decrypt_and_verify(&ciphertext, &cipher, sig, &signer).unwrap();
        assert_eq!(opened.data(), b"plain");
        assert!(!opened.is_ciphertext());

        let wrong = SecureData::decrypt_and_verify(&ciphertext, &MockCipher { key: 0x12 }, alloc::vec![], &signer);
        assert_eq!(wrong, Err(PayloadError::Crypto(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_capability_failures_propagate() {
        let data = SecureData::new(b"x".to_vec());
        assert_eq!(data.sign(&Broken), Err(PayloadError::Crypto(CryptoError::SigningFailed)));
        assert_eq!(data.decrypt(&Broken), Err(PayloadError::Crypto(CryptoError::DecryptionFailed)));
        assert_eq!(data.encrypt(&Broken), Err(PayloadError::Crypto(CryptoError::EncryptionFailed)));
    }

    #[test]
    fn test_verify_this() {
        let signer = MockSigner { key: 2 };
        let data = SecureData::signed(b"hello".to_vec(), &signer).unwrap();

        assert_eq!(data.verify_this(&signer), Ok(()));
        assert_eq!(data.verify_this(&MockSigner { key: 3 }), Err(PayloadError::SignatureMismatch));
        assert_eq!(
            SecureData::new(b"unsigned".to_vec()).verify_this(&signer),
            Err(PayloadError::SignatureMismatch)
        );
        assert_eq!(
            data.verify_this(&Broken),
            Err(PayloadError::Crypto(CryptoError::VerificationFailed))
        );
    }

    #[test]
    fn test_conversions_carry_timestamp() {
        let cipher = MockCipher { key: 0x21 };
        let signer = MockSigner { key: 5 };
        let proof = TimestampProof::issue(1_700_000_000_000, None, &signer).unwrap();
        let plain = SecureData::signed(b"ticket".to_vec(), &signer)
            .unwrap()
            .with_timestamp(Some(proof.clone()));

        let sealed = plain.to_encrypted(&cipher, Some(&signer)).unwrap();
        assert!(sealed.is_ciphertext());
        assert_eq!(sealed.timestamp(), Some(&proof));
        assert!(sealed.verify(&signer).unwrap());

        // Without a signer the plaintext signature travels unchanged
        let resealed = plain.to_encrypted(&cipher, None).unwrap();
        assert_eq!(resealed.signature(), plain.signature());

        let opened = resealed.to_decrypted(&cipher, Some(&signer)).unwrap();
        assert!(!opened.is_ciphertext());
        assert_eq!(opened, plain);

        // The ciphertext signature does not cover the plaintext
        assert_eq!(
            sealed.to_decrypted(&cipher, Some(&signer)),
            Err(PayloadError::ConstructionFault)
        );
        assert_eq!(
            sealed.to_decrypted(&MockCipher { key: 0x22 }, None),
            Err(PayloadError::Crypto(CryptoError::DecryptionFailed))
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let signer = MockSigner { key: 1 };
        let original = SecureData::signed(b"abc".to_vec(), &signer).unwrap();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set_data(b"abd".to_vec());
        assert_eq!(original.data(), b"abc");
        assert_ne!(copy, original);
    }

    #[test]
    fn test_debug_redacts_payload() {
        let data = SecureData::new(b"top secret".to_vec());
        let rendered = alloc::format!("{:?}", data);
        assert!(!rendered.contains("top secret"));
        assert!(rendered.contains("length: 10"));
    }
}
