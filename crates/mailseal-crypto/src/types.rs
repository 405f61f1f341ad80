use serde::{Deserialize, Serialize};

/// AES-GCM nonce length in bytes (96 bits per NIST recommendation).
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// Minimum PBKDF2 iteration count accepted for user key derivation.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Text marker prepended to V2 envelopes.
pub const V2_MARKER: &str = "v2:";

/// Legacy envelopes carry no marker, so a bare base64 string must be longer
/// than this to be treated as one.
pub const LEGACY_MIN_TEXT_LENGTH: usize = 20;

/// Authenticated cipher used to seal payloads.
///
/// Serializes to the identifier the browser crypto API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[serde(rename = "AES-GCM")]
    Aes256Gcm,
}

impl CipherAlgorithm {
    pub fn key_bits(self) -> u32 {
        match self {
            CipherAlgorithm::Aes256Gcm => (AES_KEY_LENGTH * 8) as u32,
        }
    }

    pub fn tag_bits(self) -> u32 {
        match self {
            CipherAlgorithm::Aes256Gcm => (TAG_LENGTH * 8) as u32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes256Gcm => "AES-GCM",
        }
    }
}

/// Password-based key stretching function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    #[serde(rename = "PBKDF2-SHA256")]
    Pbkdf2Sha256,
}

impl KdfAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            KdfAlgorithm::Pbkdf2Sha256 => "PBKDF2-SHA256",
        }
    }
}

/// Envelope wire format version.
///
/// `Legacy` envelopes predate the text marker and are only ever decoded.
/// New envelopes are always written as the current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    Legacy,
    V2,
}

impl FormatVersion {
    /// Version written by `encode`.
    pub const CURRENT: FormatVersion = FormatVersion::V2;

    /// Text marker written in front of the base64 body, if any.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            FormatVersion::Legacy => None,
            FormatVersion::V2 => Some(V2_MARKER),
        }
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        FormatVersion::CURRENT
    }
}
