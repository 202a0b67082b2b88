//! Share ledger: visible share balances per account.
//!
//! Shares locked in open sell orders or held by the bonding reserve are not
//! part of any visible balance, so `circulating() <= total_supply()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::error::PoolError;

/// Account to share balance mapping plus the fixed total supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    balances: BTreeMap<AccountId, u128>,
    total_supply: u128,
}

impl ShareLedger {
    /// Creates an empty ledger with zero supply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the total supply. Called once when the pool initializes.
    pub(crate) fn set_total_supply(&mut self, total_supply: u128) {
        self.total_supply = total_supply;
    }

    /// Total share supply fixed at initialization.
    #[must_use]
    pub const fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Visible balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of every visible balance.
    #[must_use]
    pub fn circulating(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |acc, balance| acc.saturating_add(*balance))
    }

    /// Iterates over holders with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.balances.iter().map(|(account, balance)| (account, *balance))
    }

    pub(crate) fn credit(&mut self, account: &AccountId, amount: u128) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        let updated = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        self.balances.insert(account.clone(), updated);
        Ok(())
    }

    pub(crate) fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), PoolError> {
        let available = self.balance_of(account);
        let remaining = available
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientShares {
                required: amount,
                available,
            })?;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), remaining);
        }
        Ok(())
    }

    pub(crate) fn move_shares(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), PoolError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Removes and returns the whole balance of `account`.
    pub(crate) fn take_all(&mut self, account: &AccountId) -> u128 {
        self.balances.remove(account).unwrap_or(0)
    }
}
