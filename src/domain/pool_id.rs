//! Type-safe pool identifier.
//!
//! [`PoolId`] wraps a [`uuid::Uuid`] (v4). The pool's ledger account is
//! derived from it, so one identifier addresses the pool both in the
//! registry and on the asset ledger.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::AccountId;

/// Prefix of every pool ledger account.
pub const POOL_ACCOUNT_PREFIX: &str = "pool:";

/// Unique identifier for a share pool.
///
/// Generated once at issuance and immutable thereafter. Used as the key in
/// [`super::PoolRegistry`], as event discriminator and as WebSocket
/// subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct PoolId(uuid::Uuid);

impl PoolId {
    /// Creates a new random `PoolId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PoolId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Ledger account holding the pool's tokens: `pool:<uuid>`.
    #[must_use]
    pub fn account(&self) -> AccountId {
        AccountId::new(format!("{POOL_ACCOUNT_PREFIX}{}", self.0))
    }

    /// Recovers the pool id from a pool ledger account.
    #[must_use]
    pub fn from_account(account: &AccountId) -> Option<Self> {
        account
            .as_str()
            .strip_prefix(POOL_ACCOUNT_PREFIX)
            .and_then(|raw| raw.parse().ok())
            .map(Self)
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PoolId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PoolId> for uuid::Uuid {
    fn from(id: PoolId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(PoolId::new(), PoolId::new());
    }

    #[test]
    fn account_is_prefixed_uuid() {
        let id = PoolId::new();
        let account = id.account();
        assert!(account.as_str().starts_with("pool:"));
        assert_eq!(account.as_str().len(), "pool:".len() + 36);
    }

    #[test]
    fn account_round_trip() {
        let id = PoolId::new();
        assert_eq!(PoolId::from_account(&id.account()), Some(id));
        assert_eq!(PoolId::from_account(&AccountId::from("alice")), None);
        assert_eq!(PoolId::from_account(&AccountId::from("pool:nope")), None);
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = PoolId::new();
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{id}\""));
    }
}
