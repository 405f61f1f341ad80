//! ToggleStateStore: persisted encryption preferences.
//!
//! Effective `enabled` = (stored enabled OR always_encrypt) AND supported.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::service::EncryptionService;
use crate::storage::PreferenceStore;

/// Effective encryption preferences for UI callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleState {
    pub enabled: bool,
    pub supported: bool,
    pub always_encrypt: bool,
    pub user_initialized: bool,
}

pub struct ToggleStateStore<S: PreferenceStore> {
    store: S,
    service: Arc<EncryptionService>,
    enabled_key: String,
    always_encrypt_key: String,
}

impl<S: PreferenceStore> ToggleStateStore<S> {
    pub fn new(store: S, service: Arc<EncryptionService>) -> Self {
        let enabled_key = service.config().enabled_key();
        let always_encrypt_key = service.config().always_encrypt_key();
        Self {
            store,
            service,
            enabled_key,
            always_encrypt_key,
        }
    }

    pub fn get_state(&self) -> Result<ToggleState> {
        let supported = self.service.is_supported();
        let stored_enabled = self.read_flag(&self.enabled_key)?;
        let always_encrypt = self.read_flag(&self.always_encrypt_key)?;
        Ok(ToggleState {
            enabled: (stored_enabled || always_encrypt) && supported,
            supported,
            always_encrypt,
            user_initialized: self.service.get_encryption_info().user_initialized,
        })
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.write_flag(&self.enabled_key, enabled)
    }

    pub fn set_always_encrypt(&self, always_encrypt: bool) -> Result<()> {
        self.write_flag(&self.always_encrypt_key, always_encrypt)
    }

    fn read_flag(&self, key: &str) -> Result<bool> {
        Ok(self.store.get(key)?.as_deref() == Some("true"))
    }

    fn write_flag(&self, key: &str, value: bool) -> Result<()> {
        self.store.set(key, if value { "true" } else { "false" })?;
        Ok(())
    }
}
