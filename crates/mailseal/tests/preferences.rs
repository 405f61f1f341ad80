//! Toggle preferences over the bundled stores.

use std::sync::Arc;

use mailseal::{
    EncryptionService, MemoryPreferenceStore, PreferenceStore, RandomSource, SealConfig,
    ToggleStateStore,
};
use mailseal_crypto::CryptoError;

struct NoEntropy;

impl RandomSource for NoEntropy {
    fn fill(&self, _buf: &mut [u8]) -> Result<(), CryptoError> {
        Err(CryptoError::RngFailed("crypto.getRandomValues missing".into()))
    }
}

fn service() -> Arc<EncryptionService> {
    Arc::new(EncryptionService::new(SealConfig::default()).unwrap())
}

#[test]
fn precedence_table() {
    // (enabled, always, supported) -> effective
    let cases = [
        (false, false, true, false),
        (true, false, true, true),
        (false, true, true, true),
        (true, true, true, true),
        (true, false, false, false),
        (false, true, false, false),
    ];
    for (enabled, always, supported, expected) in cases {
        let svc = if supported {
            service()
        } else {
            Arc::new(
                EncryptionService::with_random_source(SealConfig::default(), Arc::new(NoEntropy))
                    .unwrap(),
            )
        };
        let toggles = ToggleStateStore::new(MemoryPreferenceStore::new(), svc);
        toggles.set_enabled(enabled).unwrap();
        toggles.set_always_encrypt(always).unwrap();
        let state = toggles.get_state().unwrap();
        assert_eq!(
            state.enabled, expected,
            "enabled={enabled} always={always} supported={supported}"
        );
        assert_eq!(state.always_encrypt, always);
        assert_eq!(state.supported, supported);
    }
}

#[tokio::test]
async fn reports_user_initialized() {
    let svc = service();
    let toggles = ToggleStateStore::new(MemoryPreferenceStore::new(), svc.clone());
    assert!(!toggles.get_state().unwrap().user_initialized);

    svc.initialize_for_user("u1", None).await.unwrap();
    assert!(toggles.get_state().unwrap().user_initialized);

    svc.clear_user_keys();
    assert!(!toggles.get_state().unwrap().user_initialized);
}

#[test]
fn namespace_scopes_keys() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let config = SealConfig {
        namespace: "acme".into(),
        ..SealConfig::default()
    };
    let svc = Arc::new(EncryptionService::new(config).unwrap());
    let toggles = ToggleStateStore::new(store.clone(), svc);
    toggles.set_enabled(true).unwrap();

    assert_eq!(
        store.get("acme-encryption-enabled").unwrap().as_deref(),
        Some("true")
    );
    assert!(store.get("mailoreply-encryption-enabled").unwrap().is_none());
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_preferences_persist() {
    use mailseal::SqlitePreferenceStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.db");

    {
        let store = SqlitePreferenceStore::open(&path).unwrap();
        let toggles = ToggleStateStore::new(store, service());
        toggles.set_always_encrypt(true).unwrap();
    }

    let store = SqlitePreferenceStore::open(&path).unwrap();
    let toggles = ToggleStateStore::new(store, service());
    let state = toggles.get_state().unwrap();
    assert!(state.always_encrypt);
    assert!(state.enabled);
}
