//! AES-256-GCM sealing with a derived user key.
//!
//! Raw layout produced/consumed here: [12 bytes: nonce][N bytes: ciphertext + 16-byte tag].
//! Text framing lives in `envelope`.

use std::fmt;
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, NONCE_LENGTH};

/// Generate a random 12-byte nonce for AES-GCM.
pub fn generate_nonce() -> Result<[u8; NONCE_LENGTH], CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(nonce)
}

/// Output of a single seal: the nonce it used and the ciphertext with tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}

/// Opaque handle to a user's AES-256-GCM key.
///
/// Cheap to clone. The raw key bytes are not retained after construction and
/// the cipher state is zeroized when the last handle drops. No serialization,
/// and `Debug` is redacted.
#[derive(Clone)]
pub struct UserKey {
    cipher: Arc<Aes256Gcm>,
}

impl UserKey {
    /// Build a handle from 32 bytes of key material.
    pub fn from_bytes(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != AES_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: AES_KEY_LENGTH,
                got: key.len(),
            });
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        })?;
        Ok(Self {
            cipher: Arc::new(cipher),
        })
    }

    /// Seal with a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed, CryptoError> {
        let nonce = generate_nonce()?;
        self.seal_with_nonce(nonce, plaintext)
    }

    /// Seal with a caller-supplied nonce. The caller owns nonce uniqueness.
    pub fn seal_with_nonce(
        &self,
        nonce: [u8; NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Sealed, CryptoError> {
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        Ok(Sealed { nonce, ciphertext })
    }

    /// Verify and decrypt. Any tag mismatch is `DecryptionFailed`.
    pub fn open(
        &self,
        nonce: &[u8; NONCE_LENGTH],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// True if both handles share the same underlying cipher instance.
    pub fn same_handle(&self, other: &UserKey) -> bool {
        Arc::ptr_eq(&self.cipher, &other.cipher)
    }
}

impl fmt::Debug for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserKey(<redacted>)")
    }
}
