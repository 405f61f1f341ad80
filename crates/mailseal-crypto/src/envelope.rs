//! Envelope text codec.
//!
//! V2:     "v2:" + base64([12 bytes: nonce][N bytes: ciphertext + tag])
//! Legacy:         base64([12 bytes: nonce][N bytes: ciphertext + tag])
//!
//! Knows nothing about keys or the cipher; only the byte and text layout.

use crate::base64::{base64_decode, base64_encode, is_canonical_base64};
use crate::error::CryptoError;
use crate::types::{FormatVersion, LEGACY_MIN_TEXT_LENGTH, NONCE_LENGTH, V2_MARKER};

/// A parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: FormatVersion,
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}

/// Encode a nonce and ciphertext as current-version envelope text.
pub fn encode(nonce: &[u8; NONCE_LENGTH], ciphertext: &[u8]) -> String {
    encode_version(FormatVersion::CURRENT, nonce, ciphertext)
}

/// Encode under an explicit version. Only used to produce legacy fixtures
/// and for migrations; new envelopes should go through `encode`.
pub fn encode_version(
    version: FormatVersion,
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &[u8],
) -> String {
    let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    combined.extend_from_slice(nonce);
    combined.extend_from_slice(ciphertext);
    let body = base64_encode(&combined);
    match version.marker() {
        Some(marker) => format!("{marker}{body}"),
        None => body,
    }
}

/// Parse envelope text, dispatching on the version marker.
pub fn decode(text: &str) -> Result<Envelope, CryptoError> {
    let (version, body) = match text.strip_prefix(V2_MARKER) {
        Some(rest) => (FormatVersion::V2, rest),
        None => (FormatVersion::Legacy, text),
    };

    let combined = base64_decode(body)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {e}")))?;
    if combined.len() < NONCE_LENGTH {
        return Err(CryptoError::MalformedEnvelope(format!(
            "decoded length {} shorter than {NONCE_LENGTH}-byte nonce",
            combined.len()
        )));
    }

    let mut nonce = [0u8; NONCE_LENGTH];
    nonce.copy_from_slice(&combined[..NONCE_LENGTH]);
    Ok(Envelope {
        version,
        nonce,
        ciphertext: combined[NONCE_LENGTH..].to_vec(),
    })
}

/// Heuristic used before display: does `text` look like envelope text?
///
/// V2 text must carry non-empty canonical base64 after the marker. Unmarked text must
/// be canonical base64 longer than `LEGACY_MIN_TEXT_LENGTH` characters.
pub fn is_envelope_formatted(text: &str) -> bool {
    match text.strip_prefix(V2_MARKER) {
        Some(body) => !body.is_empty() && is_canonical_base64(body),
        None => text.len() > LEGACY_MIN_TEXT_LENGTH && is_canonical_base64(text),
    }
}

/// Short lock-icon placeholder for showing envelope text in a UI.
pub fn format_encrypted_display(text: &str) -> String {
    let body = text.strip_prefix(V2_MARKER).unwrap_or(text);
    let preview: String = body.chars().take(16).collect();
    format!("🔒 Encrypted ({preview}...)")
}
