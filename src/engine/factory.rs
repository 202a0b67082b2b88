//! Pool factory: creates pools and collects the issue fee.

use super::account::{AccountId, TokenId};
use super::error::PoolError;
use super::ledger::AssetLedger;
use super::pool::SharePool;

/// Issues new pools, charging a flat fee paid to a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolFactory {
    owner: AccountId,
    issue_fee: u128,
    fee_token: TokenId,
    beneficiary: Option<AccountId>,
}

impl PoolFactory {
    /// Creates a factory administered by `owner`, charging `issue_fee` of
    /// `fee_token`.
    ///
    /// No fee moves until a beneficiary is set.
    #[must_use]
    pub const fn new(owner: AccountId, issue_fee: u128, fee_token: TokenId) -> Self {
        Self {
            owner,
            issue_fee,
            fee_token,
            beneficiary: None,
        }
    }

    /// Account allowed to change the fee settings.
    #[must_use]
    pub const fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Current fee and beneficiary.
    #[must_use]
    pub fn fee(&self) -> (u128, Option<&AccountId>) {
        (self.issue_fee, self.beneficiary.as_ref())
    }

    /// Token the fee is paid in.
    #[must_use]
    pub const fn fee_token(&self) -> &TokenId {
        &self.fee_token
    }

    /// Replaces the issue fee.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotOwner`] unless `caller` owns the factory.
    pub fn set_fee(&mut self, caller: &AccountId, issue_fee: u128) -> Result<(), PoolError> {
        self.ensure_owner(caller)?;
        self.issue_fee = issue_fee;
        Ok(())
    }

    /// Replaces the fee beneficiary.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotOwner`] unless `caller` owns the factory.
    pub fn set_beneficiary(
        &mut self,
        caller: &AccountId,
        beneficiary: Option<AccountId>,
    ) -> Result<(), PoolError> {
        self.ensure_owner(caller)?;
        self.beneficiary = beneficiary;
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), PoolError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(PoolError::NotOwner)
        }
    }

    /// Charges the issue fee to `owner` and returns a fresh pool living at
    /// `address`.
    ///
    /// # Errors
    ///
    /// Propagates a failed fee transfer; no pool is created in that case.
    pub fn issue<L: AssetLedger>(
        &self,
        ledger: &mut L,
        address: AccountId,
        owner: AccountId,
        payment_asset: TokenId,
        name: &str,
        symbol: &str,
    ) -> Result<SharePool, PoolError> {
        if let Some(beneficiary) = &self.beneficiary {
            ledger.transfer(&self.fee_token, &owner, beneficiary, self.issue_fee)?;
            tracing::debug!(%owner, %beneficiary, fee = self.issue_fee, "issue fee paid");
        }
        Ok(SharePool::new(address, owner, payment_asset, name, symbol))
    }
}
