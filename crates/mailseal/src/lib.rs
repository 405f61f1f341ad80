//! Client-side sealing of user-authored message text.
//!
//! A per-user AES-256-GCM key is derived from the signed-in identity with
//! PBKDF2-SHA256, held in memory for the session, and used to turn plaintext
//! into envelope text (`"v2:" + base64(nonce || ciphertext)`) before it is
//! sent anywhere. Preferences deciding whether to seal live in a
//! [`PreferenceStore`].

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod payload;
pub mod platform;
pub mod service;
pub mod storage;
pub mod toggle;

pub use config::SealConfig;
pub use engine::KeyDerivationEngine;
pub use error::{Result, SealError, StoreError};
pub use identity::{IdentityProvider, StaticIdentity, UserIdentity};
pub use payload::{
    prepare_email_payload, prepare_reply_payload, EmailPayload, EmailRequest, ReplyPayload,
    ReplyRequest,
};
pub use platform::{OsRandom, RandomSource};
pub use service::{EncryptionInfo, EncryptionService, UserKeyContext};
pub use storage::{MemoryPreferenceStore, PreferenceStore};
#[cfg(feature = "sqlite")]
pub use storage::SqlitePreferenceStore;
pub use toggle::{ToggleState, ToggleStateStore};

pub use mailseal_crypto::{format_encrypted_display, is_envelope_formatted, CipherAlgorithm};
