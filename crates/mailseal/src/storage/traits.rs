//! Persisted key-value capability used for user preferences.

use std::sync::Arc;

use crate::error::StoreError;

/// String key-value store for preference flags.
///
/// Values are whatever the caller wrote; flags are stored as `"true"` /
/// `"false"`. Implementations surface their own I/O failures unchanged.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
