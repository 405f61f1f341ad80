//! PBKDF2-SHA256 key derivation.
//!
//! V2 (per user):
//!     password = "{namespace}-user-{userId}-{email|unknown}"
//!     salt     = "{namespace}-salt-{userId}-v2"
//! Legacy (one key shared by every user, read-only):
//!     password = "{namespace}-ai-encryption-key-v1"
//!     salt     = "{namespace}-salt"
//!
//! Deterministic, so keys are re-derived per session and never stored.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::aes_gcm::UserKey;
use crate::error::CryptoError;
use crate::types::{FormatVersion, KdfAlgorithm, AES_KEY_LENGTH, MIN_PBKDF2_ITERATIONS};

/// Placeholder used in the key material when the user has no email.
pub const UNKNOWN_EMAIL: &str = "unknown";

/// Fixed derivation parameters. Changing any of these for an existing
/// `version` would orphan every envelope already issued under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationParams {
    pub algorithm: KdfAlgorithm,
    pub namespace: String,
    pub iterations: u32,
    pub version: FormatVersion,
}

impl DerivationParams {
    pub fn new(namespace: impl Into<String>, iterations: u32, version: FormatVersion) -> Self {
        Self {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            namespace: namespace.into(),
            iterations,
            version,
        }
    }

    /// Same namespace and cost, other envelope version.
    pub fn for_version(&self, version: FormatVersion) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// True if the key depends on the user identity.
    pub fn is_per_user(&self) -> bool {
        match self.version {
            FormatVersion::Legacy => false,
            FormatVersion::V2 => true,
        }
    }

    /// Password input for the KDF. Legacy ignores the identity.
    pub fn key_material(&self, user_id: &str, email: Option<&str>) -> Zeroizing<String> {
        Zeroizing::new(match self.version {
            FormatVersion::Legacy => format!("{}-ai-encryption-key-v1", self.namespace),
            FormatVersion::V2 => format!(
                "{}-user-{}-{}",
                self.namespace,
                user_id,
                email.unwrap_or(UNKNOWN_EMAIL)
            ),
        })
    }

    pub fn salt(&self, user_id: &str) -> String {
        match self.version {
            FormatVersion::Legacy => format!("{}-salt", self.namespace),
            FormatVersion::V2 => format!("{}-salt-{}-v2", self.namespace, user_id),
        }
    }
}

/// Raw PBKDF2-HMAC-SHA256 into a 256-bit key.
pub fn pbkdf2_sha256(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    let mut okm = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut okm[..]);
    okm
}

/// Derive the AES-256-GCM key for a user identity. Requires per-user params.
pub fn derive_user_key(
    params: &DerivationParams,
    user_id: &str,
    email: Option<&str>,
) -> Result<UserKey, CryptoError> {
    if !params.is_per_user() {
        return Err(CryptoError::DerivationFailed(format!(
            "{:?} parameters do not derive per-user keys",
            params.version
        )));
    }
    derive(params, user_id, email)
}

/// Derive the shared key that opened unmarked envelopes.
pub fn derive_legacy_key(params: &DerivationParams) -> Result<UserKey, CryptoError> {
    if params.is_per_user() {
        return Err(CryptoError::DerivationFailed(format!(
            "{:?} parameters derive per-user keys only",
            params.version
        )));
    }
    derive(params, "", None)
}

fn derive(
    params: &DerivationParams,
    user_id: &str,
    email: Option<&str>,
) -> Result<UserKey, CryptoError> {
    if params.iterations < MIN_PBKDF2_ITERATIONS {
        return Err(CryptoError::DerivationFailed(format!(
            "iteration count {} below minimum {}",
            params.iterations, MIN_PBKDF2_ITERATIONS
        )));
    }
    let material = params.key_material(user_id, email);
    let salt = params.salt(user_id);
    let okm = match params.algorithm {
        KdfAlgorithm::Pbkdf2Sha256 => {
            pbkdf2_sha256(material.as_bytes(), salt.as_bytes(), params.iterations)
        }
    };
    UserKey::from_bytes(&okm[..])
}
