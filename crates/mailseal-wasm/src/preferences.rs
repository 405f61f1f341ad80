//! Encryption preferences persisted in `window.localStorage`.

use mailseal::{PreferenceStore, StoreError, ToggleStateStore};
use wasm_bindgen::prelude::*;

use crate::error::{to_js_error, to_js_value};
use crate::service::WasmEncryptionService;

/// `PreferenceStore` over the page's localStorage.
pub struct LocalStoragePreferences {
    storage: web_sys::Storage,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for LocalStoragePreferences {}
unsafe impl Sync for LocalStoragePreferences {}

impl LocalStoragePreferences {
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Backend("no window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_store_error)?
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_store_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_store_error)
    }
}

fn js_store_error(e: JsValue) -> StoreError {
    StoreError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

#[wasm_bindgen]
pub struct WasmToggleStore {
    inner: ToggleStateStore<LocalStoragePreferences>,
}

#[wasm_bindgen]
impl WasmToggleStore {
    #[wasm_bindgen(constructor)]
    pub fn new(service: &WasmEncryptionService) -> Result<WasmToggleStore, JsValue> {
        let store = LocalStoragePreferences::open().map_err(to_js_error)?;
        Ok(WasmToggleStore {
            inner: ToggleStateStore::new(store, service.inner.clone()),
        })
    }

    /// `{ enabled, supported, alwaysEncrypt, userInitialized }`
    #[wasm_bindgen(js_name = "getState")]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let state = self.inner.get_state().map_err(to_js_error)?;
        to_js_value(&state)
    }

    #[wasm_bindgen(js_name = "setEnabled")]
    pub fn set_enabled(&self, enabled: bool) -> Result<(), JsValue> {
        self.inner.set_enabled(enabled).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "setAlwaysEncrypt")]
    pub fn set_always_encrypt(&self, always_encrypt: bool) -> Result<(), JsValue> {
        self.inner
            .set_always_encrypt(always_encrypt)
            .map_err(to_js_error)
    }
}
