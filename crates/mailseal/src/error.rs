use mailseal_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by `EncryptionService`, `ToggleStateStore` and the
/// payload helpers. Nothing here carries key material or plaintext.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("Cryptographic primitives are not available on this platform")]
    PlatformUnsupported,

    #[error("Encryption key not initialized")]
    KeyNotInitialized,

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Decryption failed: data may be corrupted or sealed for another user")]
    DecryptionFailed,

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<CryptoError> for SealError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::MalformedEnvelope(msg) => SealError::MalformedEnvelope(msg),
            CryptoError::DecryptionFailed => SealError::DecryptionFailed,
            CryptoError::DerivationFailed(msg) => SealError::DerivationFailed(msg),
            CryptoError::InvalidKeyLength { .. } => SealError::DerivationFailed(err.to_string()),
            CryptoError::EncryptionFailed(msg) | CryptoError::RngFailed(msg) => {
                SealError::EncryptionFailed(msg)
            }
        }
    }
}

/// Failure reported by a `PreferenceStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preference backend error: {0}")]
    Backend(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, SealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_errors_map_onto_taxonomy() {
        let malformed: SealError = CryptoError::MalformedEnvelope("x".into()).into();
        assert!(matches!(malformed, SealError::MalformedEnvelope(_)));

        let tag: SealError = CryptoError::DecryptionFailed.into();
        assert!(matches!(tag, SealError::DecryptionFailed));

        let kdf: SealError = CryptoError::DerivationFailed("x".into()).into();
        assert!(matches!(kdf, SealError::DerivationFailed(_)));

        let rng: SealError = CryptoError::RngFailed("x".into()).into();
        assert!(matches!(rng, SealError::EncryptionFailed(_)));
    }

    #[test]
    fn store_errors_wrap() {
        let err: SealError = StoreError::Backend("quota exceeded".into()).into();
        assert_eq!(
            err.to_string(),
            "Storage error: Preference backend error: quota exceeded"
        );
    }
}
