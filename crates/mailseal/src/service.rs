//! EncryptionService: per-session key lifecycle plus seal/open of message text.
//!
//! State machine:
//!   Uninitialized → Initializing(identity, pending) → Ready(context) → Uninitialized
//!
//! The active `UserKeyContext` is swapped wholesale under a lock, never
//! mutated field by field. Each transition into `Initializing` bumps a
//! generation counter; a derivation only installs its key if the generation
//! it started under is still current, so a `clear_user_keys` or a switch to
//! another user during derivation wins. While `Initializing`, the slot holds
//! the pending key cell every joining caller awaits, so joiners never start a
//! second derivation between resolution and the `Ready` install.
//!
//! Unmarked legacy envelopes open with the shared legacy key, derived once on
//! first use and kept for the life of the service.

use std::fmt;
use std::sync::Arc;

use mailseal_crypto::{
    derive_legacy_key, envelope, CipherAlgorithm, DerivationParams, FormatVersion, UserKey,
    NONCE_LENGTH,
};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::SealConfig;
use crate::engine::{off_thread, KeyDerivationEngine};
use crate::error::{Result, SealError};
use crate::identity::{IdentityProvider, UserIdentity};
use crate::platform::{probe, OsRandom, RandomSource};

/// The active user and their derived key. Never serialized or logged.
pub struct UserKeyContext {
    user_id: String,
    user_email: Option<String>,
    key: UserKey,
}

impl UserKeyContext {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }
}

impl fmt::Debug for UserKeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserKeyContext")
            .field("user_id", &self.user_id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

type PendingKey = Arc<OnceCell<UserKey>>;

enum KeyState {
    Uninitialized,
    Initializing {
        identity: UserIdentity,
        pending: PendingKey,
    },
    Ready(Arc<UserKeyContext>),
}

struct Slot {
    state: KeyState,
    generation: u64,
}

/// Read-only diagnostics. Contains no key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionInfo {
    pub supported: bool,
    pub algorithm: CipherAlgorithm,
    pub key_length: u32,
    pub user_initialized: bool,
    pub key_ready: bool,
}

/// What `resolve_key` decided to do after inspecting the current state.
enum Resolution {
    Use(UserKey),
    Join(UserIdentity),
    Lookup,
}

pub struct EncryptionService {
    config: SealConfig,
    engine: KeyDerivationEngine,
    random: Arc<dyn RandomSource>,
    supported: bool,
    identity: Option<Arc<dyn IdentityProvider>>,
    slot: Mutex<Slot>,
    legacy_params: DerivationParams,
    legacy: OnceCell<UserKey>,
}

impl EncryptionService {
    /// Create a service using the OS/browser CSPRNG. Validates `config`.
    pub fn new(config: SealConfig) -> Result<Self> {
        Self::with_random_source(config, Arc::new(OsRandom))
    }

    /// Create a service drawing nonces from `random`. The source is probed
    /// once here; if it fails, every operation reports `PlatformUnsupported`.
    pub fn with_random_source(config: SealConfig, random: Arc<dyn RandomSource>) -> Result<Self> {
        config.validate()?;
        let supported = probe(random.as_ref());
        if !supported {
            warn!("random source unavailable; encryption disabled");
        }
        let params = config.derivation_params();
        Ok(Self {
            legacy_params: params.for_version(FormatVersion::Legacy),
            legacy: OnceCell::new(),
            engine: KeyDerivationEngine::new(params),
            config,
            random,
            supported,
            identity: None,
            slot: Mutex::new(Slot {
                state: KeyState::Uninitialized,
                generation: 0,
            }),
        })
    }

    /// Attach the session identity provider used for ambient/implicit users.
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    pub fn config(&self) -> &SealConfig {
        &self.config
    }

    pub fn engine(&self) -> &KeyDerivationEngine {
        &self.engine
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    fn ensure_supported(&self) -> Result<()> {
        if self.supported {
            Ok(())
        } else {
            Err(SealError::PlatformUnsupported)
        }
    }

    /// User id of the active or initializing context.
    pub fn active_user_id(&self) -> Option<String> {
        match &self.slot.lock().state {
            KeyState::Uninitialized => None,
            KeyState::Initializing { identity, .. } => Some(identity.user_id.clone()),
            KeyState::Ready(ctx) => Some(ctx.user_id.clone()),
        }
    }

    /// Make `user_id` the active user. No-op if already ready for that user.
    pub async fn initialize_for_user(&self, user_id: &str, user_email: Option<&str>) -> Result<()> {
        self.ensure_supported()?;
        self.establish(UserIdentity::new(user_id, user_email))
            .await
            .map(|_| ())
    }

    /// Initialize for whoever the identity provider reports as signed in.
    /// Returns `false` when there is no provider or nobody is signed in.
    pub async fn initialize_from_session(&self) -> Result<bool> {
        self.ensure_supported()?;
        let Some(identity) = self.current_identity().await else {
            return Ok(false);
        };
        self.establish(identity).await?;
        Ok(true)
    }

    /// Seal `plaintext` into envelope text for the active (or given) user.
    pub async fn encrypt(&self, plaintext: &str, user_id: Option<&str>) -> Result<String> {
        self.ensure_supported()?;
        let key = self.resolve_key(user_id).await?;

        let mut nonce = [0u8; NONCE_LENGTH];
        self.random.fill(&mut nonce)?;
        let sealed = key.seal_with_nonce(nonce, plaintext.as_bytes())?;
        Ok(envelope::encode(&sealed.nonce, &sealed.ciphertext))
    }

    /// Open envelope text sealed for the active (or given) user. Unmarked
    /// legacy envelopes open with the shared legacy key and need no user.
    pub async fn decrypt(&self, envelope_text: &str, user_id: Option<&str>) -> Result<String> {
        self.ensure_supported()?;
        let parsed = envelope::decode(envelope_text)?;
        let key = match parsed.version {
            FormatVersion::Legacy => self.legacy_key().await?,
            FormatVersion::V2 => self.resolve_key(user_id).await?,
        };

        let plaintext = key.open(&parsed.nonce, &parsed.ciphertext).map_err(|e| {
            warn!(version = ?parsed.version, "envelope failed authentication");
            SealError::from(e)
        })?;
        String::from_utf8(plaintext).map_err(|_| SealError::InvalidUtf8)
    }

    /// Drop the active context (logout). Idempotent.
    pub fn clear_user_keys(&self) {
        let mut slot = self.slot.lock();
        if !matches!(slot.state, KeyState::Uninitialized) {
            debug!("clearing user key context");
        }
        slot.generation += 1;
        slot.state = KeyState::Uninitialized;
    }

    pub fn get_encryption_info(&self) -> EncryptionInfo {
        let slot = self.slot.lock();
        let algorithm = CipherAlgorithm::Aes256Gcm;
        EncryptionInfo {
            supported: self.supported,
            algorithm,
            key_length: algorithm.key_bits(),
            user_initialized: !matches!(slot.state, KeyState::Uninitialized),
            key_ready: matches!(slot.state, KeyState::Ready(_)),
        }
    }

    /// Seal and open `message` for the session user. `Ok(false)` if nobody
    /// is signed in or the round trip did not reproduce the message.
    pub async fn self_test(&self, message: &str) -> Result<bool> {
        self.ensure_supported()?;
        let Some(identity) = self.current_identity().await else {
            return Ok(false);
        };
        self.establish(identity.clone()).await?;
        let sealed = self.encrypt(message, Some(&identity.user_id)).await?;
        let opened = self.decrypt(&sealed, Some(&identity.user_id)).await?;
        Ok(opened == message)
    }

    async fn legacy_key(&self) -> Result<UserKey> {
        self.legacy
            .get_or_try_init(|| {
                debug!("deriving legacy key");
                let params = self.legacy_params.clone();
                off_thread(move || derive_legacy_key(&params))
            })
            .await
            .cloned()
    }

    async fn current_identity(&self) -> Option<UserIdentity> {
        match &self.identity {
            Some(provider) => provider.current_identity().await,
            None => None,
        }
    }

    /// Pick the key for an operation, initializing if the operation asks for
    /// a user that is not active.
    async fn resolve_key(&self, requested: Option<&str>) -> Result<UserKey> {
        let resolution = {
            let slot = self.slot.lock();
            match (&slot.state, requested) {
                (KeyState::Ready(ctx), None) => Resolution::Use(ctx.key.clone()),
                (KeyState::Ready(ctx), Some(id)) if ctx.user_id == id => {
                    Resolution::Use(ctx.key.clone())
                }
                (KeyState::Initializing { identity, .. }, None) => {
                    Resolution::Join(identity.clone())
                }
                (KeyState::Initializing { identity, .. }, Some(id)) if identity.user_id == id => {
                    Resolution::Join(identity.clone())
                }
                _ => Resolution::Lookup,
            }
        };

        match resolution {
            Resolution::Use(key) => Ok(key),
            Resolution::Join(identity) => self.establish(identity).await,
            Resolution::Lookup => {
                let identity = self.lookup_identity(requested).await?;
                self.establish(identity).await
            }
        }
    }

    /// Identity for a user that is not active. An explicit user id takes the
    /// session's email only if the session user is that same user.
    async fn lookup_identity(&self, requested: Option<&str>) -> Result<UserIdentity> {
        let session = self.current_identity().await;
        match requested {
            Some(user_id) => {
                let email = session
                    .filter(|s| s.user_id == user_id)
                    .and_then(|s| s.email);
                Ok(UserIdentity {
                    user_id: user_id.to_string(),
                    email,
                })
            }
            None => session.ok_or(SealError::KeyNotInitialized),
        }
    }

    /// Transition to `Ready(identity)` unless already there, returning the key.
    async fn establish(&self, identity: UserIdentity) -> Result<UserKey> {
        let (generation, pending) = {
            let mut slot = self.slot.lock();
            let joined = match &slot.state {
                KeyState::Ready(ctx) if ctx.user_id == identity.user_id => {
                    return Ok(ctx.key.clone());
                }
                KeyState::Initializing {
                    identity: current,
                    pending,
                } if *current == identity => Some(pending.clone()),
                _ => None,
            };
            let pending = match joined {
                Some(pending) => pending,
                None => {
                    let previous = match &slot.state {
                        KeyState::Ready(ctx) => Some(ctx.user_id.clone()),
                        KeyState::Initializing { identity, .. } => Some(identity.user_id.clone()),
                        KeyState::Uninitialized => None,
                    };
                    if let Some(previous) = previous {
                        debug!(from = %previous, to = %identity.user_id, "replacing user key context");
                    }
                    let pending: PendingKey = Arc::new(OnceCell::new());
                    slot.generation += 1;
                    slot.state = KeyState::Initializing {
                        identity: identity.clone(),
                        pending: pending.clone(),
                    };
                    pending
                }
            };
            (slot.generation, pending)
        };

        debug!(user_id = %identity.user_id, "initializing user key");
        let derived = pending
            .get_or_try_init(|| self.engine.derive_key(&identity))
            .await
            .cloned();

        let mut slot = self.slot.lock();
        if slot.generation != generation {
            debug!(user_id = %identity.user_id, "key derivation superseded");
            return match (&slot.state, derived) {
                // A later transition already installed this same user.
                (KeyState::Ready(ctx), _) if ctx.user_id == identity.user_id => {
                    Ok(ctx.key.clone())
                }
                (_, Err(e)) => Err(e),
                _ => Err(SealError::KeyNotInitialized),
            };
        }

        match derived {
            Ok(key) => {
                if let KeyState::Ready(ctx) = &slot.state {
                    // A joined caller got here first.
                    return Ok(ctx.key.clone());
                }
                slot.state = KeyState::Ready(Arc::new(UserKeyContext {
                    user_id: identity.user_id.clone(),
                    user_email: identity.email.clone(),
                    key: key.clone(),
                }));
                debug!(user_id = %identity.user_id, "user key ready");
                Ok(key)
            }
            Err(e) => {
                warn!(user_id = %identity.user_id, error = %e, "user key derivation failed");
                slot.generation += 1;
                slot.state = KeyState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Snapshot of the active context, if ready.
    pub fn context(&self) -> Option<Arc<UserKeyContext>> {
        match &self.slot.lock().state {
            KeyState::Ready(ctx) => Some(ctx.clone()),
            _ => None,
        }
    }
}
