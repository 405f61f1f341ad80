pub mod aes_gcm;
pub mod base64;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod types;

pub use aes_gcm::{generate_nonce, Sealed, UserKey};
pub use base64::{base64_decode, base64_encode};
pub use envelope::{
    decode, encode, encode_version, format_encrypted_display, is_envelope_formatted, Envelope,
};
pub use error::CryptoError;
pub use kdf::{derive_legacy_key, derive_user_key, pbkdf2_sha256, DerivationParams, UNKNOWN_EMAIL};
pub use types::{
    CipherAlgorithm, FormatVersion, KdfAlgorithm, AES_KEY_LENGTH, MIN_PBKDF2_ITERATIONS,
    NONCE_LENGTH, TAG_LENGTH, V2_MARKER,
};
