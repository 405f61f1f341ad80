use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // No detail: tampering, wrong key and corruption must look the same.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
