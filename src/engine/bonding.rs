//! Constant-product bonding curve for primary share issuance.
//!
//! ```text
//! purchase:  Δs = Rs · Δp / (Rp + Δp)     Rs -= Δs, Rp += Δp
//! redeem:    Δp = Rp · Δs / (Rs + Δs)     Rs += Δs, Rp -= Δp
//! ```
//!
//! The payment reserve starts from a virtual amount chosen at
//! initialization. Only payment actually received through purchases
//! (`proceeds`) can be paid out by redemptions.

use serde::{Deserialize, Serialize};

use super::error::PoolError;

/// Share and payment reserves backing primary issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondingCurve {
    reserve_shares: u128,
    reserve_payment: u128,
    proceeds: u128,
    closed: bool,
}

impl BondingCurve {
    /// Creates a curve holding `reserve_shares` priced against a virtual
    /// payment reserve.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidAmount`] if either reserve is zero.
    pub fn new(reserve_shares: u128, virtual_payment: u128) -> Result<Self, PoolError> {
        if reserve_shares == 0 || virtual_payment == 0 {
            return Err(PoolError::InvalidAmount("bonding reserves must be non-zero"));
        }
        Ok(Self {
            reserve_shares,
            reserve_payment: virtual_payment,
            proceeds: 0,
            closed: false,
        })
    }

    /// Shares still held by the curve.
    #[must_use]
    pub const fn reserve_shares(&self) -> u128 {
        self.reserve_shares
    }

    /// Payment reserve used for pricing (virtual part included).
    #[must_use]
    pub const fn reserve_payment(&self) -> u128 {
        self.reserve_payment
    }

    /// Payment actually held by the curve.
    #[must_use]
    pub const fn proceeds(&self) -> u128 {
        self.proceeds
    }

    /// Returns `true` once the pool has terminated.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shares a purchase of `payment_in` would yield.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Overflow`] on arithmetic overflow.
    pub fn quote_purchase(&self, payment_in: u128) -> Result<u128, PoolError> {
        let numerator = self
            .reserve_shares
            .checked_mul(payment_in)
            .ok_or(PoolError::Overflow)?;
        let denominator = self
            .reserve_payment
            .checked_add(payment_in)
            .ok_or(PoolError::Overflow)?;
        numerator.checked_div(denominator).ok_or(PoolError::Overflow)
    }

    /// Payment a redemption of `shares_in` would yield.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Overflow`] on arithmetic overflow.
    pub fn quote_redeem(&self, shares_in: u128) -> Result<u128, PoolError> {
        let numerator = self
            .reserve_payment
            .checked_mul(shares_in)
            .ok_or(PoolError::Overflow)?;
        let denominator = self
            .reserve_shares
            .checked_add(shares_in)
            .ok_or(PoolError::Overflow)?;
        numerator.checked_div(denominator).ok_or(PoolError::Overflow)
    }

    /// Sells shares out of the reserve for `payment_in`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::SlippageExceeded`] if the output is below
    /// `min_shares_out`, [`PoolError::InvalidAmount`] if it rounds to zero.
    pub(crate) fn purchase(
        &mut self,
        payment_in: u128,
        min_shares_out: u128,
    ) -> Result<u128, PoolError> {
        let shares_out = self.quote_purchase(payment_in)?;
        if shares_out == 0 {
            return Err(PoolError::InvalidAmount("purchase yields zero shares"));
        }
        if shares_out < min_shares_out {
            return Err(PoolError::SlippageExceeded {
                minimum: min_shares_out,
                actual: shares_out,
            });
        }

        self.reserve_shares = self
            .reserve_shares
            .checked_sub(shares_out)
            .ok_or(PoolError::InsufficientLiquidity)?;
        self.reserve_payment = self
            .reserve_payment
            .checked_add(payment_in)
            .ok_or(PoolError::Overflow)?;
        self.proceeds = self
            .proceeds
            .checked_add(payment_in)
            .ok_or(PoolError::Overflow)?;
        Ok(shares_out)
    }

    /// Buys `shares_in` back into the reserve.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::SlippageExceeded`] if the output is below
    /// `min_payment_out`, [`PoolError::InsufficientLiquidity`] if the real
    /// proceeds cannot cover it.
    pub(crate) fn redeem(
        &mut self,
        shares_in: u128,
        min_payment_out: u128,
    ) -> Result<u128, PoolError> {
        let payment_out = self.quote_redeem(shares_in)?;
        if payment_out == 0 {
            return Err(PoolError::InvalidAmount("redemption yields zero payment"));
        }
        if payment_out < min_payment_out {
            return Err(PoolError::SlippageExceeded {
                minimum: min_payment_out,
                actual: payment_out,
            });
        }

        self.proceeds = self
            .proceeds
            .checked_sub(payment_out)
            .ok_or(PoolError::InsufficientLiquidity)?;
        self.reserve_payment = self
            .reserve_payment
            .checked_sub(payment_out)
            .ok_or(PoolError::InsufficientLiquidity)?;
        self.reserve_shares = self
            .reserve_shares
            .checked_add(shares_in)
            .ok_or(PoolError::Overflow)?;
        Ok(payment_out)
    }

    /// Closes the curve, handing back its unsold shares and real proceeds.
    pub(crate) fn close(&mut self) -> (u128, u128) {
        self.closed = true;
        (
            std::mem::take(&mut self.reserve_shares),
            std::mem::take(&mut self.proceeds),
        )
    }
}
