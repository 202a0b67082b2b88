//! Trade tax expressed in tenths of a percent.

use serde::{Deserialize, Serialize};

use super::error::PoolError;

/// Denominator of [`TaxRate`]: a rate of `100` is 10%.
pub const TAX_DENOMINATOR: u128 = 1_000;

/// Tax skimmed from trade settlement value and paid to the pool owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from a per-mille value.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidTaxRate`] above 1000 (100%).
    pub fn new(per_mille: u32) -> Result<Self, PoolError> {
        if u128::from(per_mille) > TAX_DENOMINATOR {
            return Err(PoolError::InvalidTaxRate(per_mille));
        }
        Ok(Self(per_mille))
    }

    /// Returns the raw per-mille value.
    #[must_use]
    pub const fn per_mille(self) -> u32 {
        self.0
    }

    /// Tax owed on a settlement value, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Overflow`] on arithmetic overflow.
    pub fn tax_on(self, value: u128) -> Result<u128, PoolError> {
        value
            .checked_mul(u128::from(self.0))
            .map(|v| v / TAX_DENOMINATOR)
            .ok_or(PoolError::Overflow)
    }

    /// Settlement value of `quantity` shares at `price`, before tax.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Overflow`] on arithmetic overflow.
    pub fn net(price: u128, quantity: u128) -> Result<u128, PoolError> {
        price.checked_mul(quantity).ok_or(PoolError::Overflow)
    }

    /// Settlement value of `quantity` shares at `price`, tax included.
    ///
    /// This is the escrow a buy order holds for its remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Overflow`] on arithmetic overflow.
    pub fn gross(self, price: u128, quantity: u128) -> Result<u128, PoolError> {
        let net = Self::net(price, quantity)?;
        net.checked_add(self.tax_on(net)?).ok_or(PoolError::Overflow)
    }
}
