//! Session identity seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The signed-in user a key is derived for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.map(str::to_string),
        }
    }
}

/// Supplies the current session's user on demand. Authentication itself
/// happens elsewhere; `None` means nobody is signed in.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Option<UserIdentity>;
}

/// Fixed identity, for embedders that already hold the session user.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identity: Option<UserIdentity>,
}

impl StaticIdentity {
    pub fn new(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl IdentityProvider for StaticIdentity {
    async fn current_identity(&self) -> Option<UserIdentity> {
        self.identity.clone()
    }
}
