//! Session identity supplied by a JS callback.

use async_trait::async_trait;
use mailseal::{IdentityProvider, UserIdentity};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Wraps a JS function returning `{ userId, email? }`, `null`, or a promise
/// of either.
pub struct JsIdentityProvider {
    callback: js_sys::Function,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for JsIdentityProvider {}
unsafe impl Sync for JsIdentityProvider {}

impl JsIdentityProvider {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }

    async fn resolve(&self) -> Result<JsValue, JsValue> {
        let value = self.callback.call0(&JsValue::NULL)?;
        match value.dyn_into::<js_sys::Promise>() {
            Ok(promise) => JsFuture::from(promise).await,
            Err(value) => Ok(value),
        }
    }
}

#[async_trait(?Send)]
impl IdentityProvider for JsIdentityProvider {
    async fn current_identity(&self) -> Option<UserIdentity> {
        let value = match self.resolve().await {
            Ok(value) => value,
            Err(e) => {
                web_sys::console::warn_2(
                    &JsValue::from_str("[mailseal] identity lookup failed:"),
                    &e,
                );
                return None;
            }
        };
        if value.is_undefined() || value.is_null() {
            return None;
        }
        match serde_wasm_bindgen::from_value::<UserIdentity>(value) {
            Ok(identity) if !identity.user_id.is_empty() => Some(identity),
            Ok(_) => None,
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "[mailseal] identity callback returned an unexpected value: {e}"
                )));
                None
            }
        }
    }
}
