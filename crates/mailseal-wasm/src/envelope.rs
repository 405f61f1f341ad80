//! Envelope helpers usable without a service instance.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_name = "isEnvelopeFormatted")]
pub fn wasm_is_envelope_formatted(text: &str) -> bool {
    mailseal::is_envelope_formatted(text)
}

#[wasm_bindgen(js_name = "formatEncryptedDisplay")]
pub fn wasm_format_encrypted_display(text: &str) -> String {
    mailseal::format_encrypted_display(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_body_preview() {
        assert_eq!(
            wasm_format_encrypted_display("v2:AAECAwQFBgcICQoLDA0ODw=="),
            "🔒 Encrypted (AAECAwQFBgcICQoL...)"
        );
        assert!(!wasm_is_envelope_formatted("hello"));
    }
}
