//! KeyDerivationEngine: single-flight PBKDF2 user key derivation.
//!
//! Concurrent requests for the same identity share one in-flight derivation.
//! Nothing is cached once a derivation resolves: the engine only coalesces,
//! the caller decides where the resulting key lives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mailseal_crypto::{derive_user_key, CryptoError, DerivationParams, UserKey};
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Result, SealError};
use crate::identity::UserIdentity;

type Flight = Arc<OnceCell<UserKey>>;

pub struct KeyDerivationEngine {
    params: DerivationParams,
    /// identity → shared cell resolved by whichever caller runs the derivation
    in_flight: Mutex<HashMap<UserIdentity, Flight>>,
    started: AtomicU64,
}

impl KeyDerivationEngine {
    pub fn new(params: DerivationParams) -> Self {
        Self {
            params,
            in_flight: Mutex::new(HashMap::new()),
            started: AtomicU64::new(0),
        }
    }

    pub fn params(&self) -> &DerivationParams {
        &self.params
    }

    /// Number of derivations actually executed (coalesced callers excluded).
    pub fn derivations_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Derive the key for `identity`, joining an in-flight derivation for the
    /// same identity if there is one.
    pub async fn derive_key(&self, identity: &UserIdentity) -> Result<UserKey> {
        let flight = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(identity) {
                Some(existing) => {
                    debug!(user_id = %identity.user_id, "joining in-flight key derivation");
                    existing.clone()
                }
                None => {
                    let flight: Flight = Arc::new(OnceCell::new());
                    in_flight.insert(identity.clone(), flight.clone());
                    flight
                }
            }
        };

        let result = flight
            .get_or_try_init(|| self.run(identity))
            .await
            .cloned();

        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(identity)
            .is_some_and(|current| Arc::ptr_eq(current, &flight))
        {
            in_flight.remove(identity);
        }
        result
    }

    async fn run(&self, identity: &UserIdentity) -> Result<UserKey> {
        self.started.fetch_add(1, Ordering::Relaxed);
        debug!(user_id = %identity.user_id, iterations = self.params.iterations, "deriving user key");

        let params = self.params.clone();
        let user_id = identity.user_id.clone();
        let email = identity.email.clone();
        let derive = move || derive_user_key(&params, &user_id, email.as_deref());
        off_thread(derive).await
    }
}

/// Run a CPU-bound derivation on the blocking pool when a tokio runtime is
/// available, inline otherwise.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn off_thread<F>(derive: F) -> Result<UserKey>
where
    F: FnOnce() -> std::result::Result<UserKey, CryptoError> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(derive)
            .await
            .map_err(|e| SealError::DerivationFailed(e.to_string()))?
            .map_err(SealError::from),
        Err(_) => derive().map_err(SealError::from),
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn off_thread<F>(derive: F) -> Result<UserKey>
where
    F: FnOnce() -> std::result::Result<UserKey, CryptoError>,
{
    derive().map_err(SealError::from)
}
