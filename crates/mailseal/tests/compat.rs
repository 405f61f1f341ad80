//! Envelopes produced by the browser implementation must keep opening.
//!
//! Fixtures were sealed with AES-256-GCM under fixed nonces, using keys
//! derived exactly as the browser derived them (PBKDF2-SHA256, 100k
//! iterations).

use mailseal::{format_encrypted_display, is_envelope_formatted, EncryptionService, SealConfig};
use mailseal_crypto::{decode, FormatVersion};

/// u1 / john@x.com, nonce 00..0b.
const V2_FIXTURE: &str =
    "v2:AAECAwQFBgcICQoLGZzv3YsC217T09VBLf9g5bJYIJP+qsMol40ojfvqRJhTOaB7HMwUlMj/eAUNX3rvvRN7RNM=";
const V2_PLAINTEXT: &str = "Hi John, following up on our meeting.";

/// Shared legacy key ("mailoreply-ai-encryption-key-v1" / "mailoreply-salt"),
/// unprefixed, nonce [7; 12].
const LEGACY_FIXTURE: &str = "BwcHBwcHBwcHBwcHbMM5qZU4YVjXceHHIQbLESk5R/YPFxYcUc05";
const LEGACY_PLAINTEXT: &str = "legacy body";

/// Shared legacy key, nonce 00..0b.
const LEGACY_PROMPT_FIXTURE: &str =
    "AAECAwQFBgcICQoLNBTZ/jRW3WSl5dbIlgfUpDCnvRNpX9iydtnYIrtnCW51Zq1+LyYg7A==";
const LEGACY_PROMPT_PLAINTEXT: &str = "Draft a reply saying yes";

#[tokio::test]
async fn opens_browser_v2_envelope() {
    let svc = EncryptionService::new(SealConfig::default()).unwrap();
    svc.initialize_for_user("u1", Some("john@x.com"))
        .await
        .unwrap();
    assert_eq!(svc.decrypt(V2_FIXTURE, None).await.unwrap(), V2_PLAINTEXT);
}

#[tokio::test]
async fn opens_legacy_envelopes_without_a_user() {
    let svc = EncryptionService::new(SealConfig::default()).unwrap();
    assert_eq!(
        svc.decrypt(LEGACY_FIXTURE, None).await.unwrap(),
        LEGACY_PLAINTEXT
    );
    assert_eq!(
        svc.decrypt(LEGACY_PROMPT_FIXTURE, None).await.unwrap(),
        LEGACY_PROMPT_PLAINTEXT
    );
    assert!(svc.context().is_none());
}

#[tokio::test]
async fn legacy_key_ignores_the_active_user() {
    let svc = EncryptionService::new(SealConfig::default()).unwrap();
    svc.initialize_for_user("u1", Some("john@x.com"))
        .await
        .unwrap();
    assert_eq!(
        svc.decrypt(LEGACY_FIXTURE, Some("u2")).await.unwrap(),
        LEGACY_PLAINTEXT
    );
    // V2 still uses the user key alongside
    assert_eq!(svc.decrypt(V2_FIXTURE, None).await.unwrap(), V2_PLAINTEXT);
}

#[tokio::test]
async fn other_namespace_cannot_open_legacy() {
    let config = SealConfig {
        namespace: "acme".into(),
        ..SealConfig::default()
    };
    let svc = EncryptionService::new(config).unwrap();
    assert!(matches!(
        svc.decrypt(LEGACY_FIXTURE, None).await,
        Err(mailseal::SealError::DecryptionFailed)
    ));
}

#[test]
fn version_dispatch() {
    let v2 = decode(V2_FIXTURE).unwrap();
    assert_eq!(v2.version, FormatVersion::V2);
    assert_eq!(v2.nonce, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    assert_eq!(v2.ciphertext.len(), V2_PLAINTEXT.len() + 16);

    let legacy = decode(LEGACY_FIXTURE).unwrap();
    assert_eq!(legacy.version, FormatVersion::Legacy);
    assert_eq!(legacy.nonce, [7u8; 12]);
    assert_eq!(legacy.ciphertext.len(), LEGACY_PLAINTEXT.len() + 16);
}

#[test]
fn fixtures_look_like_envelopes() {
    assert!(is_envelope_formatted(V2_FIXTURE));
    assert!(is_envelope_formatted(LEGACY_FIXTURE));
    assert!(!is_envelope_formatted(V2_PLAINTEXT));
    assert!(!is_envelope_formatted("short"));
}

#[test]
fn display_placeholder() {
    assert_eq!(
        format_encrypted_display(V2_FIXTURE),
        "🔒 Encrypted (AAECAwQFBgcICQoL...)"
    );
    assert_eq!(
        format_encrypted_display(LEGACY_FIXTURE),
        "🔒 Encrypted (BwcHBwcHBwcHBwcH...)"
    );
}
