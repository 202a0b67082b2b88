//! Asset ledger adapter.
//!
//! The pool never owns token balances itself: it asks an [`AssetLedger`] to
//! move tokens between accounts and its own pool account. Transfers are
//! fail-fast; a failed transfer aborts the whole pool operation.
//!
//! [`InMemoryLedger`] is the concrete adapter used by the gateway and the
//! test suite.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::account::{AccountId, TokenId};

/// Failure reported by the asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The debited account does not hold enough of the token.
    #[error("insufficient {token} balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        /// Token being moved.
        token: TokenId,
        /// Account being debited.
        account: AccountId,
        /// Amount requested.
        required: u128,
        /// Amount held.
        available: u128,
    },

    /// Crediting the account would overflow its balance.
    #[error("{token} balance overflow for {account}")]
    Overflow {
        /// Token being moved.
        token: TokenId,
        /// Account being credited.
        account: AccountId,
    },
}

/// Token movement interface consumed by the exchange engine.
///
/// Implementations must either apply a transfer in full or leave every
/// balance untouched.
pub trait AssetLedger {
    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// A zero amount is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if `from` holds less than
    /// `amount`, or [`LedgerError::Overflow`] if `to` cannot be credited.
    fn transfer(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Returns the balance of `token` held by `account`.
    fn balance_of(&self, token: &TokenId, account: &AccountId) -> u128;
}

/// Multi-token ledger kept entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: HashMap<TokenId, HashMap<AccountId, u128>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits newly created tokens to `account`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the balance would overflow.
    pub fn mint(
        &mut self,
        token: &TokenId,
        account: &AccountId,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        let balance = self
            .balances
            .entry(token.clone())
            .or_default()
            .entry(account.clone())
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| LedgerError::Overflow {
            token: token.clone(),
            account: account.clone(),
        })?;
        Ok(*balance)
    }

    /// Returns the sum of all balances of `token`.
    #[must_use]
    pub fn total_of(&self, token: &TokenId) -> u128 {
        self.balances
            .get(token)
            .map(|accounts| accounts.values().fold(0u128, |acc, b| acc.saturating_add(*b)))
            .unwrap_or(0)
    }
}

impl AssetLedger for InMemoryLedger {
    fn transfer(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let available = self.balance_of(token, from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                token: token.clone(),
                account: from.clone(),
                required: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                token: token.clone(),
                account: to.clone(),
            })?;

        let accounts = self.balances.entry(token.clone()).or_default();
        accounts.insert(from.clone(), remaining);
        accounts.insert(to.clone(), credited);
        Ok(())
    }

    fn balance_of(&self, token: &TokenId, account: &AccountId) -> u128 {
        self.balances
            .get(token)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn funded() -> (InMemoryLedger, TokenId, AccountId, AccountId) {
        let mut ledger = InMemoryLedger::new();
        let token = TokenId::from("TKO");
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        let Ok(_) = ledger.mint(&token, &alice, 1_000) else {
            panic!("mint failed");
        };
        (ledger, token, alice, bob)
    }

    #[test]
    fn transfer_moves_balance() {
        let (mut ledger, token, alice, bob) = funded();
        assert!(ledger.transfer(&token, &alice, &bob, 400).is_ok());
        assert_eq!(ledger.balance_of(&token, &alice), 600);
        assert_eq!(ledger.balance_of(&token, &bob), 400);
        assert_eq!(ledger.total_of(&token), 1_000);
    }

    #[test]
    fn insufficient_balance_leaves_ledger_untouched() {
        let (mut ledger, token, alice, bob) = funded();
        let result = ledger.transfer(&token, &alice, &bob, 1_001);
        let Err(LedgerError::InsufficientBalance {
            required,
            available,
            ..
        }) = result
        else {
            panic!("expected insufficient balance, got {result:?}");
        };
        assert_eq!(required, 1_001);
        assert_eq!(available, 1_000);
        assert_eq!(ledger.balance_of(&token, &alice), 1_000);
        assert_eq!(ledger.balance_of(&token, &bob), 0);
    }

    #[test]
    fn zero_transfer_is_noop() {
        let (mut ledger, token, _, bob) = funded();
        let carol = AccountId::from("carol");
        assert!(ledger.transfer(&token, &bob, &carol, 0).is_ok());
        assert_eq!(ledger.balance_of(&token, &carol), 0);
    }

    #[test]
    fn mint_overflow_is_reported() {
        let (mut ledger, token, alice, _) = funded();
        let result = ledger.mint(&token, &alice, u128::MAX);
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let (mut ledger, token, alice, _) = funded();
        assert!(ledger.transfer(&token, &alice, &alice, 500).is_ok());
        assert_eq!(ledger.balance_of(&token, &alice), 1_000);
    }
}
