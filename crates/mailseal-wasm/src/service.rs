//! WasmEncryptionService: the sealing service exposed to JavaScript.
//!
//! Key derivation runs inline on the calling thread; construct the service
//! inside a worker if a 100k-iteration PBKDF2 pause on the UI thread matters.

use std::sync::Arc;

use mailseal::{
    prepare_email_payload, prepare_reply_payload, EmailRequest, EncryptionService, ReplyRequest,
    SealConfig,
};
use wasm_bindgen::prelude::*;

use crate::error::{from_js_or_default, to_js_error, to_js_value};

#[wasm_bindgen]
pub struct WasmEncryptionService {
    pub(crate) inner: Arc<EncryptionService>,
}

#[wasm_bindgen]
impl WasmEncryptionService {
    /// `config` is an optional `{ namespace?, iterations? }` object.
    /// `identity` is an optional callback returning the signed-in
    /// `{ userId, email? }` (or a promise of it), used when no user has
    /// been initialized explicitly.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        identity: Option<js_sys::Function>,
    ) -> Result<WasmEncryptionService, JsValue> {
        console_error_panic_hook::set_once();
        let config: SealConfig = from_js_or_default(config)?;
        let service = EncryptionService::new(config).map_err(to_js_error)?;
        Ok(WasmEncryptionService {
            inner: Arc::new(attach_identity(service, identity)),
        })
    }

    #[wasm_bindgen(js_name = "isSupported")]
    pub fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    #[wasm_bindgen(js_name = "initializeForUser")]
    pub async fn initialize_for_user(
        &self,
        user_id: String,
        user_email: Option<String>,
    ) -> Result<(), JsValue> {
        self.inner
            .initialize_for_user(&user_id, user_email.as_deref())
            .await
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "initializeFromSession")]
    pub async fn initialize_from_session(&self) -> Result<bool, JsValue> {
        self.inner
            .initialize_from_session()
            .await
            .map_err(to_js_error)
    }

    pub async fn encrypt(
        &self,
        plaintext: String,
        user_id: Option<String>,
    ) -> Result<String, JsValue> {
        self.inner
            .encrypt(&plaintext, user_id.as_deref())
            .await
            .map_err(to_js_error)
    }

    pub async fn decrypt(
        &self,
        envelope_text: String,
        user_id: Option<String>,
    ) -> Result<String, JsValue> {
        self.inner
            .decrypt(&envelope_text, user_id.as_deref())
            .await
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "clearUserKeys")]
    pub fn clear_user_keys(&self) {
        self.inner.clear_user_keys();
    }

    #[wasm_bindgen(js_name = "getEncryptionInfo")]
    pub fn get_encryption_info(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.inner.get_encryption_info())
    }

    #[wasm_bindgen(js_name = "selfTest")]
    pub async fn self_test(&self, message: String) -> Result<bool, JsValue> {
        self.inner.self_test(&message).await.map_err(to_js_error)
    }

    /// `{ originalMessage, language, tone, intent, encrypted }` → payload object.
    #[wasm_bindgen(js_name = "prepareReplyPayload")]
    pub async fn prepare_reply_payload(
        &self,
        request: JsValue,
        token: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let request: ReplyRequest = serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;
        let payload = prepare_reply_payload(&self.inner, request, token.as_deref())
            .await
            .map_err(to_js_error)?;
        to_js_value(&payload)
    }

    /// `{ prompt, language, tone, encrypted }` → payload object.
    #[wasm_bindgen(js_name = "prepareEmailPayload")]
    pub async fn prepare_email_payload(
        &self,
        request: JsValue,
        token: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let request: EmailRequest = serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;
        let payload = prepare_email_payload(&self.inner, request, token.as_deref())
            .await
            .map_err(to_js_error)?;
        to_js_value(&payload)
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_identity(
    service: EncryptionService,
    identity: Option<js_sys::Function>,
) -> EncryptionService {
    match identity {
        Some(callback) => service.with_identity_provider(Arc::new(
            crate::identity::JsIdentityProvider::new(callback),
        )),
        None => service,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn attach_identity(
    service: EncryptionService,
    _identity: Option<js_sys::Function>,
) -> EncryptionService {
    service
}
