//! Sealing configuration.

use mailseal_crypto::{DerivationParams, FormatVersion, MIN_PBKDF2_ITERATIONS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SealError};

pub const DEFAULT_NAMESPACE: &str = "mailoreply";
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Options for an `EncryptionService`.
///
/// Every field has a default, so `{}` is a valid JSON config. The namespace
/// feeds the key material, the salt and the preference keys; changing it
/// makes previously issued envelopes unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SealConfig {
    pub namespace: String,
    pub iterations: u32,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl SealConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SealConfig =
            serde_json::from_str(json).map_err(|e| SealError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(SealError::InvalidConfig("namespace must not be empty".into()));
        }
        if self.iterations < MIN_PBKDF2_ITERATIONS {
            return Err(SealError::InvalidConfig(format!(
                "iterations must be at least {MIN_PBKDF2_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        Ok(())
    }

    /// Derivation parameters for the current envelope version.
    pub fn derivation_params(&self) -> DerivationParams {
        DerivationParams::new(
            self.namespace.clone(),
            self.iterations,
            FormatVersion::CURRENT,
        )
    }

    /// Preference key for the "encrypt by default" flag.
    pub fn enabled_key(&self) -> String {
        format!("{}-encryption-enabled", self.namespace)
    }

    /// Preference key for the "always encrypt" flag.
    pub fn always_encrypt_key(&self) -> String {
        format!("{}-always-encrypt", self.namespace)
    }
}
