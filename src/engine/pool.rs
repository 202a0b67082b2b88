//! The exchange engine: one share pool and every operation on it.
//!
//! Each state-changing call runs against a draft copy of the pool and of the
//! asset ledger. The drafts replace the originals only if the whole call
//! succeeds, so a failure at any step (a rejected transfer included) leaves
//! both exactly as they were.

use serde::{Deserialize, Serialize};

use super::account::{AccountId, TokenId};
use super::bonding::BondingCurve;
use super::error::PoolError;
use super::ledger::AssetLedger;
use super::lifecycle::{Operation, PoolState};
use super::order_book::{Order, OrderBook, OrderSide};
use super::shares::ShareLedger;
use super::tax::TaxRate;

/// Largest supported share precision.
pub const MAX_SHARE_PRECISION: u32 = 18;

/// Whole-pool share count before precision scaling: shares are percentages.
const SHARE_UNITS: u128 = 100;

/// A fungible token held by the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Token reference.
    pub token: TokenId,
    /// Amount currently held by the pool.
    pub amount: u128,
    /// Amount at termination; numerator of every pro-rata payout.
    pub settlement_amount: u128,
}

/// Parameters fixed by [`SharePool::initialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// Trade tax in tenths of a percent.
    pub tax_rate: u32,
    /// Decimal exponent applied to the 100 whole shares.
    pub share_precision: u32,
    /// Virtual payment reserve. When set, the whole supply is issued through
    /// a bonding curve instead of being credited to the owner.
    pub bonding_reserve: Option<u128>,
}

/// A token amount paid out of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Token paid.
    pub token: TokenId,
    /// Amount paid.
    pub amount: u128,
}

/// Outcome of [`SharePool::accept`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// The counterparty order as it stands after the fill.
    pub order: Order,
    /// Account that accepted the order.
    pub taker: AccountId,
    /// Shares exchanged.
    pub amount: u128,
    /// Payment exchanged before tax.
    pub value: u128,
    /// Tax forwarded to the owner.
    pub tax: u128,
}

impl Fill {
    /// Returns `true` if the fill closed the order.
    #[must_use]
    pub const fn closed_order(&self) -> bool {
        self.order.remaining_amount == 0
    }
}

/// Outcome of a bonding-curve purchase or redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveTrade {
    /// Trading account.
    pub account: AccountId,
    /// `Buy` for purchases, `Sell` for redemptions.
    pub side: OrderSide,
    /// Shares issued or redeemed.
    pub shares: u128,
    /// Payment paid in or out, tax excluded.
    pub payment: u128,
    /// Tax forwarded to the owner.
    pub tax: u128,
    /// Share reserve after the trade.
    pub reserve_shares: u128,
    /// Payment reserve after the trade.
    pub reserve_payment: u128,
}

/// Outcome of [`SharePool::terminate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// Per-asset settlement amounts.
    pub settlement: Vec<Payout>,
    /// Unsold curve shares credited to the owner.
    pub curve_shares: u128,
    /// Curve proceeds paid to the owner.
    pub curve_proceeds: u128,
}

/// Outcome of [`SharePool::withdraw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Withdrawing account.
    pub account: AccountId,
    /// Shares burned.
    pub shares: u128,
    /// Asset slices paid.
    pub payouts: Vec<Payout>,
}

/// A pool of fungible assets and the shares issued against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePool {
    address: AccountId,
    owner: AccountId,
    payment_asset: TokenId,
    name: String,
    symbol: String,
    state: PoolState,
    tax_rate: TaxRate,
    share_precision: u32,
    shares: ShareLedger,
    orders: OrderBook,
    assets: Vec<Asset>,
    curve: Option<BondingCurve>,
}

impl SharePool {
    /// Creates a pool in the `Created` state.
    ///
    /// `address` is the pool's own ledger account; every token the pool
    /// holds sits there.
    #[must_use]
    pub fn new(
        address: AccountId,
        owner: AccountId,
        payment_asset: TokenId,
        name: impl Into<String>,
        symbol: &str,
    ) -> Self {
        Self {
            address,
            owner,
            payment_asset,
            name: name.into(),
            symbol: format!("% {symbol}"),
            state: PoolState::Created,
            tax_rate: TaxRate::default(),
            share_precision: 0,
            shares: ShareLedger::new(),
            orders: OrderBook::new(),
            assets: Vec::new(),
            curve: None,
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Pool ledger account.
    #[must_use]
    pub const fn address(&self) -> &AccountId {
        &self.address
    }

    /// Privileged account.
    #[must_use]
    pub const fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Settlement currency of share trades.
    #[must_use]
    pub const fn payment_asset(&self) -> &TokenId {
        &self.payment_asset
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share symbol, prefixed with `"% "`.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PoolState {
        self.state
    }

    /// Trade tax.
    #[must_use]
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Share precision fixed at initialization.
    #[must_use]
    pub const fn share_precision(&self) -> u32 {
        self.share_precision
    }

    /// Total share supply; zero before initialization.
    #[must_use]
    pub const fn total_share_supply(&self) -> u128 {
        self.shares.total_supply()
    }

    /// Visible share balance of `account`.
    #[must_use]
    pub fn share_balance(&self, account: &AccountId) -> u128 {
        self.shares.balance_of(account)
    }

    /// Share ledger.
    #[must_use]
    pub const fn shares(&self) -> &ShareLedger {
        &self.shares
    }

    /// Indices of every open order, ascending.
    #[must_use]
    pub fn orders(&self) -> Vec<usize> {
        self.orders.active_indices()
    }

    /// Open order at `index`.
    #[must_use]
    pub fn order(&self, index: usize) -> Option<&Order> {
        self.orders.get(index)
    }

    /// Open order of `account`.
    #[must_use]
    pub fn order_of(&self, account: &AccountId) -> Option<&Order> {
        self.orders.order_of(account)
    }

    /// Order book.
    #[must_use]
    pub const fn order_book(&self) -> &OrderBook {
        &self.orders
    }

    /// Registered assets with their pooled balances.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Bonding curve, if the pool was initialized with one.
    #[must_use]
    pub const fn curve(&self) -> Option<&BondingCurve> {
        self.curve.as_ref()
    }

    /// `(reserve_shares, reserve_payment)` of the bonding curve.
    #[must_use]
    pub fn reserves(&self) -> Option<(u128, u128)> {
        self.curve
            .as_ref()
            .map(|curve| (curve.reserve_shares(), curve.reserve_payment()))
    }

    /// Every share accounted for: visible balances, sell-order locks and
    /// the curve reserve. Equals the total supply once initialized.
    #[must_use]
    pub fn accounted_shares(&self) -> u128 {
        let reserve = self.curve.as_ref().map_or(0, BondingCurve::reserve_shares);
        self.shares
            .circulating()
            .saturating_add(self.orders.locked_shares())
            .saturating_add(reserve)
    }

    /// Shares a purchase of `payment_in` would yield.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::CurveDisabled`] without an open bonding curve.
    pub fn quote_purchase(&self, payment_in: u128) -> Result<u128, PoolError> {
        self.open_curve(Operation::Purchase)?
            .quote_purchase(payment_in)
    }

    /// Payment a redemption of `shares_in` would yield.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::CurveDisabled`] without an open bonding curve.
    pub fn quote_redeem(&self, shares_in: u128) -> Result<u128, PoolError> {
        self.open_curve(Operation::Redeem)?.quote_redeem(shares_in)
    }

    // ---------------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------------

    /// Deposits `amount` of `token` from the owner into the pool.
    ///
    /// # Errors
    ///
    /// Owner only, `Created` only. Rejects the payment asset and zero
    /// amounts; propagates ledger failures.
    pub fn add_asset<L>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        token: &TokenId,
        amount: u128,
    ) -> Result<Asset, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::AddAsset)?;
        if *token == self.payment_asset {
            return Err(PoolError::PaymentAssetNotAllowed);
        }
        if amount == 0 {
            return Err(PoolError::InvalidAmount("asset amount must be positive"));
        }

        self.transact(ledger, |pool, ledger| {
            pool.transfer_in(ledger, token, caller, amount)?;
            let index = match pool.assets.iter().position(|a| a.token == *token) {
                Some(index) => index,
                None => {
                    pool.assets.push(Asset {
                        token: token.clone(),
                        amount: 0,
                        settlement_amount: 0,
                    });
                    pool.assets.len().saturating_sub(1)
                }
            };
            let asset = pool
                .assets
                .get_mut(index)
                .ok_or(PoolError::Overflow)?;
            asset.amount = asset.amount.checked_add(amount).ok_or(PoolError::Overflow)?;
            tracing::debug!(pool = %pool.address, %token, amount, "asset added");
            Ok(asset.clone())
        })
    }

    /// Fixes tax, precision and supply, and opens trading.
    ///
    /// Returns the total share supply.
    ///
    /// # Errors
    ///
    /// Owner only, `Created` only. Rejects a tax rate above 1000 per mille,
    /// a precision above [`MAX_SHARE_PRECISION`] and a zero bonding reserve.
    pub fn initialize(&mut self, caller: &AccountId, params: InitParams) -> Result<u128, PoolError> {
        self.guard(caller, Operation::Initialize)?;
        let tax_rate = TaxRate::new(params.tax_rate)?;
        if params.share_precision > MAX_SHARE_PRECISION {
            return Err(PoolError::InvalidPrecision(params.share_precision));
        }
        let total_supply = 10u128
            .checked_pow(params.share_precision)
            .and_then(|scale| scale.checked_mul(SHARE_UNITS))
            .ok_or(PoolError::Overflow)?;

        let curve = params
            .bonding_reserve
            .map(|reserve| BondingCurve::new(total_supply, reserve))
            .transpose()?;

        let mut shares = ShareLedger::new();
        shares.set_total_supply(total_supply);
        if curve.is_none() {
            shares.credit(&self.owner, total_supply)?;
        }

        self.tax_rate = tax_rate;
        self.share_precision = params.share_precision;
        self.shares = shares;
        self.curve = curve;
        self.state = PoolState::Initialized;
        tracing::debug!(
            pool = %self.address,
            total_supply,
            tax_rate = params.tax_rate,
            bonding = self.curve.is_some(),
            "pool initialized"
        );
        Ok(total_supply)
    }

    /// Returns every deposited asset to the owner and closes the pool
    /// without ever issuing shares.
    ///
    /// # Errors
    ///
    /// Owner only, `Created` only; propagates ledger failures.
    pub fn abort<L>(&mut self, ledger: &mut L, caller: &AccountId) -> Result<Vec<Payout>, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Abort)?;

        self.transact(ledger, |pool, ledger| {
            let mut refunds = Vec::with_capacity(pool.assets.len());
            let owner = pool.owner.clone();
            for index in 0..pool.assets.len() {
                let Some(asset) = pool.assets.get_mut(index) else {
                    continue;
                };
                let payout = Payout {
                    token: asset.token.clone(),
                    amount: std::mem::take(&mut asset.amount),
                };
                pool.transfer_out(ledger, &payout.token, &owner, payout.amount)?;
                refunds.push(payout);
            }
            pool.state = PoolState::Terminated;
            tracing::debug!(pool = %pool.address, "pool aborted");
            Ok(refunds)
        })
    }

    // ---------------------------------------------------------------------
    // Order book
    // ---------------------------------------------------------------------

    /// Locks `amount` shares of the caller in a new sell order.
    ///
    /// # Errors
    ///
    /// `Initialized` only. Fails if the caller already has an order or holds
    /// fewer than `amount` shares.
    pub fn sell(&mut self, caller: &AccountId, price: u128, amount: u128) -> Result<Order, PoolError> {
        self.guard(caller, Operation::Sell)?;
        check_order_terms(price, amount)?;
        if self.orders.order_of(caller).is_some() {
            return Err(PoolError::ActiveOrder);
        }

        let mut draft = self.clone();
        draft.shares.debit(caller, amount)?;
        let order = draft
            .orders
            .open(caller, OrderSide::Sell, price, amount, 0)?;
        *self = draft;
        tracing::debug!(pool = %self.address, %caller, index = order.index, price, amount, "sell order opened");
        Ok(order)
    }

    /// Escrows payment for `amount` shares at `price` in a new buy order.
    ///
    /// # Errors
    ///
    /// `Initialized` only. Fails if the caller already has an order or
    /// cannot fund the escrow.
    pub fn buy<L>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        price: u128,
        amount: u128,
    ) -> Result<Order, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Buy)?;
        check_order_terms(price, amount)?;
        if self.orders.order_of(caller).is_some() {
            return Err(PoolError::ActiveOrder);
        }
        let escrow = self.tax_rate.gross(price, amount)?;

        self.transact(ledger, |pool, ledger| {
            let payment = pool.payment_asset.clone();
            pool.transfer_in(ledger, &payment, caller, escrow)?;
            let order = pool.orders.open(caller, OrderSide::Buy, price, amount, escrow)?;
            tracing::debug!(pool = %pool.address, %caller, index = order.index, price, amount, escrow, "buy order opened");
            Ok(order)
        })
    }

    /// Fills `amount` of the open order of `counterparty`.
    ///
    /// # Errors
    ///
    /// `Initialized` only. Fails on a zero amount, on the caller's own
    /// order, if the counterparty has no order, if `amount` exceeds what is
    /// left, and on insufficient shares or payment.
    pub fn accept<L>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        counterparty: &AccountId,
        amount: u128,
    ) -> Result<Fill, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Accept)?;
        if amount == 0 {
            return Err(PoolError::InvalidAmount("fill amount must be positive"));
        }
        if caller == counterparty {
            return Err(PoolError::SelfTrade);
        }
        let order = self
            .orders
            .order_of(counterparty)
            .cloned()
            .ok_or_else(|| PoolError::NoActiveOrder(counterparty.to_string()))?;
        let remaining_after =
            order
                .remaining_amount
                .checked_sub(amount)
                .ok_or(PoolError::InsufficientAmount {
                    requested: amount,
                    remaining: order.remaining_amount,
                })?;
        let value = TaxRate::net(order.price, amount)?;

        self.transact(ledger, |pool, ledger| {
            let payment = pool.payment_asset.clone();
            let owner = pool.owner.clone();
            let (tax, escrow_after) = match order.side {
                OrderSide::Sell => {
                    let tax = pool.tax_rate.tax_on(value)?;
                    let cost = value.checked_add(tax).ok_or(PoolError::Overflow)?;
                    pool.transfer_in(ledger, &payment, caller, cost)?;
                    pool.transfer_out(ledger, &payment, counterparty, value)?;
                    pool.transfer_out(ledger, &payment, &owner, tax)?;
                    pool.shares.credit(caller, amount)?;
                    (tax, 0)
                }
                OrderSide::Buy => {
                    pool.shares.move_shares(caller, counterparty, amount)?;
                    let escrow_after = pool.tax_rate.gross(order.price, remaining_after)?;
                    let released = order
                        .escrow
                        .checked_sub(escrow_after)
                        .ok_or(PoolError::Overflow)?;
                    let tax = released.checked_sub(value).ok_or(PoolError::Overflow)?;
                    pool.transfer_out(ledger, &payment, caller, value)?;
                    pool.transfer_out(ledger, &payment, &owner, tax)?;
                    (tax, escrow_after)
                }
            };

            let order = pool.orders.fill(order.index, amount, escrow_after)?;
            tracing::debug!(
                pool = %pool.address,
                %caller,
                index = order.index,
                amount,
                remaining = order.remaining_amount,
                "order filled"
            );
            Ok(Fill {
                order,
                taker: caller.clone(),
                amount,
                value,
                tax,
            })
        })
    }

    /// Closes the caller's open order, returning its shares or escrow.
    ///
    /// # Errors
    ///
    /// `Initialized` or `Terminated` only. Fails if the caller has no order.
    pub fn cancel<L>(&mut self, ledger: &mut L, caller: &AccountId) -> Result<Order, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Cancel)?;

        self.transact(ledger, |pool, ledger| {
            let order = pool.orders.remove(caller)?;
            match order.side {
                OrderSide::Sell => pool.shares.credit(caller, order.remaining_amount)?,
                OrderSide::Buy => {
                    let payment = pool.payment_asset.clone();
                    pool.transfer_out(ledger, &payment, caller, order.escrow)?;
                }
            }
            tracing::debug!(pool = %pool.address, %caller, index = order.index, "order cancelled");
            Ok(order)
        })
    }

    /// Moves `amount` visible shares from the caller to `to`.
    ///
    /// # Errors
    ///
    /// `Initialized` or `Terminated` only. Fails on a zero amount or
    /// insufficient shares.
    pub fn transfer(&mut self, caller: &AccountId, to: &AccountId, amount: u128) -> Result<(), PoolError> {
        self.guard(caller, Operation::Transfer)?;
        if amount == 0 {
            return Err(PoolError::InvalidAmount("transfer amount must be positive"));
        }
        let mut shares = self.shares.clone();
        shares.move_shares(caller, to, amount)?;
        self.shares = shares;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Bonding curve
    // ---------------------------------------------------------------------

    /// Buys shares from the bonding reserve with `payment_in`, plus tax.
    ///
    /// # Errors
    ///
    /// `Initialized` only, owner excluded, curve required. Fails on slippage
    /// or if the caller cannot pay.
    pub fn purchase<L>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        payment_in: u128,
        min_shares_out: u128,
    ) -> Result<CurveTrade, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard_curve(caller, Operation::Purchase)?;
        if payment_in == 0 {
            return Err(PoolError::InvalidAmount("payment must be positive"));
        }
        let tax = self.tax_rate.tax_on(payment_in)?;
        let cost = payment_in.checked_add(tax).ok_or(PoolError::Overflow)?;

        self.transact(ledger, |pool, ledger| {
            let curve = pool.curve.as_mut().ok_or(PoolError::CurveDisabled)?;
            let shares = curve.purchase(payment_in, min_shares_out)?;
            let (reserve_shares, reserve_payment) = (curve.reserve_shares(), curve.reserve_payment());

            let payment = pool.payment_asset.clone();
            let owner = pool.owner.clone();
            pool.transfer_in(ledger, &payment, caller, cost)?;
            pool.transfer_out(ledger, &payment, &owner, tax)?;
            pool.shares.credit(caller, shares)?;
            tracing::debug!(pool = %pool.address, %caller, payment_in, shares, "curve purchase");
            Ok(CurveTrade {
                account: caller.clone(),
                side: OrderSide::Buy,
                shares,
                payment: payment_in,
                tax,
                reserve_shares,
                reserve_payment,
            })
        })
    }

    /// Sells `shares_in` back to the bonding reserve.
    ///
    /// # Errors
    ///
    /// `Initialized` only, owner excluded, curve required. Fails on
    /// insufficient shares, slippage or insufficient curve proceeds.
    pub fn redeem<L>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        shares_in: u128,
        min_payment_out: u128,
    ) -> Result<CurveTrade, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard_curve(caller, Operation::Redeem)?;
        if shares_in == 0 {
            return Err(PoolError::InvalidAmount("shares must be positive"));
        }

        self.transact(ledger, |pool, ledger| {
            pool.shares.debit(caller, shares_in)?;
            let curve = pool.curve.as_mut().ok_or(PoolError::CurveDisabled)?;
            let payout = curve.redeem(shares_in, min_payment_out)?;
            let (reserve_shares, reserve_payment) = (curve.reserve_shares(), curve.reserve_payment());

            let payment = pool.payment_asset.clone();
            pool.transfer_out(ledger, &payment, caller, payout)?;
            tracing::debug!(pool = %pool.address, %caller, shares_in, payout, "curve redemption");
            Ok(CurveTrade {
                account: caller.clone(),
                side: OrderSide::Sell,
                shares: shares_in,
                payment: payout,
                tax: 0,
                reserve_shares,
                reserve_payment,
            })
        })
    }

    // ---------------------------------------------------------------------
    // Wind-down
    // ---------------------------------------------------------------------

    /// Ends trading and fixes the settlement amount of every asset.
    ///
    /// A bonding curve, if any, closes: its unsold shares and its proceeds
    /// go to the owner.
    ///
    /// # Errors
    ///
    /// Owner only, `Initialized` only; propagates ledger failures.
    pub fn terminate<L>(&mut self, ledger: &mut L, caller: &AccountId) -> Result<Termination, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Terminate)?;

        self.transact(ledger, |pool, ledger| {
            let settlement = pool
                .assets
                .iter_mut()
                .map(|asset| {
                    asset.settlement_amount = asset.amount;
                    Payout {
                        token: asset.token.clone(),
                        amount: asset.amount,
                    }
                })
                .collect();

            let (curve_shares, curve_proceeds) =
                pool.curve.as_mut().map_or((0, 0), BondingCurve::close);
            let owner = pool.owner.clone();
            let payment = pool.payment_asset.clone();
            pool.shares.credit(&owner, curve_shares)?;
            pool.transfer_out(ledger, &payment, &owner, curve_proceeds)?;

            pool.state = PoolState::Terminated;
            tracing::debug!(pool = %pool.address, curve_shares, curve_proceeds, "pool terminated");
            Ok(Termination {
                settlement,
                curve_shares,
                curve_proceeds,
            })
        })
    }

    /// Pays the caller their pro-rata slice of every asset and burns their
    /// shares.
    ///
    /// # Errors
    ///
    /// `Terminated` only. Fails with [`PoolError::NoSharesAvailable`] if the
    /// caller holds no visible shares.
    pub fn withdraw<L>(&mut self, ledger: &mut L, caller: &AccountId) -> Result<Withdrawal, PoolError>
    where
        L: AssetLedger + Clone,
    {
        self.guard(caller, Operation::Withdraw)?;
        if self.shares.balance_of(caller) == 0 {
            return Err(PoolError::NoSharesAvailable);
        }

        self.transact(ledger, |pool, ledger| {
            let shares = pool.shares.take_all(caller);
            let total = pool.shares.total_supply();
            let mut payouts = Vec::with_capacity(pool.assets.len());
            for index in 0..pool.assets.len() {
                let Some(asset) = pool.assets.get_mut(index) else {
                    continue;
                };
                let amount = asset
                    .settlement_amount
                    .checked_mul(shares)
                    .and_then(|v| v.checked_div(total))
                    .ok_or(PoolError::Overflow)?;
                asset.amount = asset.amount.checked_sub(amount).ok_or(PoolError::Overflow)?;
                let token = asset.token.clone();
                pool.transfer_out(ledger, &token, caller, amount)?;
                payouts.push(Payout { token, amount });
            }
            tracing::debug!(pool = %pool.address, %caller, shares, "shares withdrawn");
            Ok(Withdrawal {
                account: caller.clone(),
                shares,
                payouts,
            })
        })
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Owner check first, then the operation table.
    fn guard(&self, caller: &AccountId, operation: Operation) -> Result<(), PoolError> {
        if operation.is_owner_only() && *caller != self.owner {
            return Err(PoolError::NotOwner);
        }
        if !operation.is_permitted_in(self.state) {
            return Err(PoolError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn guard_curve(&self, caller: &AccountId, operation: Operation) -> Result<(), PoolError> {
        self.guard(caller, operation)?;
        if *caller == self.owner {
            return Err(PoolError::OwnerNotAllowed);
        }
        self.open_curve(operation).map(|_| ())
    }

    fn open_curve(&self, operation: Operation) -> Result<&BondingCurve, PoolError> {
        let curve = self.curve.as_ref().ok_or(PoolError::CurveDisabled)?;
        if curve.is_closed() {
            return Err(PoolError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(curve)
    }

    /// Runs `op` on drafts of the pool and the ledger, committing both only
    /// on success.
    fn transact<L, T, F>(&mut self, ledger: &mut L, op: F) -> Result<T, PoolError>
    where
        L: AssetLedger + Clone,
        F: FnOnce(&mut Self, &mut L) -> Result<T, PoolError>,
    {
        let mut pool = self.clone();
        let mut draft = ledger.clone();
        let out = op(&mut pool, &mut draft)?;
        *self = pool;
        *ledger = draft;
        Ok(out)
    }

    fn transfer_in<L: AssetLedger>(
        &self,
        ledger: &mut L,
        token: &TokenId,
        from: &AccountId,
        amount: u128,
    ) -> Result<(), PoolError> {
        ledger
            .transfer(token, from, &self.address, amount)
            .map_err(PoolError::from)
    }

    fn transfer_out<L: AssetLedger>(
        &self,
        ledger: &mut L,
        token: &TokenId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), PoolError> {
        ledger
            .transfer(token, &self.address, to, amount)
            .map_err(PoolError::from)
    }
}

fn check_order_terms(price: u128, amount: u128) -> Result<(), PoolError> {
    if price == 0 {
        return Err(PoolError::InvalidAmount("price must be positive"));
    }
    if amount == 0 {
        return Err(PoolError::InvalidAmount("amount must be positive"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::engine::ledger::{InMemoryLedger, LedgerError};

    const PAY: &str = "PAY";

    struct Fixture {
        pool: SharePool,
        ledger: InMemoryLedger,
        owner: AccountId,
        alice: AccountId,
        bob: AccountId,
    }

    impl Fixture {
        fn new() -> Self {
            let owner = AccountId::from("owner");
            let alice = AccountId::from("alice");
            let bob = AccountId::from("bob");
            let mut ledger = InMemoryLedger::new();
            for (account, amount) in [(&owner, 1_000u128), (&alice, 100_000), (&bob, 100_000)] {
                let Ok(_) = ledger.mint(&TokenId::from(PAY), account, amount) else {
                    panic!("mint failed");
                };
            }
            let pool = SharePool::new(
                AccountId::from("pool:test"),
                owner.clone(),
                TokenId::from(PAY),
                "Test pool",
                "TST",
            );
            Self {
                pool,
                ledger,
                owner,
                alice,
                bob,
            }
        }

        fn initialized(tax_rate: u32, share_precision: u32) -> Self {
            let mut fx = Self::new();
            let params = InitParams {
                tax_rate,
                share_precision,
                bonding_reserve: None,
            };
            let Ok(_) = fx.pool.initialize(&fx.owner.clone(), params) else {
                panic!("initialize failed");
            };
            fx
        }

        fn deposit(&mut self, token: &str, amount: u128) {
            let token = TokenId::from(token);
            let owner = self.owner.clone();
            let Ok(_) = self.ledger.mint(&token, &owner, amount) else {
                panic!("mint failed");
            };
            let Ok(_) = self.pool.add_asset(&mut self.ledger, &owner, &token, amount) else {
                panic!("add_asset failed");
            };
        }

        fn pay(&self, account: &AccountId) -> u128 {
            self.ledger.balance_of(&TokenId::from(PAY), account)
        }

        fn balance(&self, token: &str, account: &AccountId) -> u128 {
            self.ledger.balance_of(&TokenId::from(token), account)
        }

        fn assert_accounting(&self) {
            assert_eq!(self.pool.accounted_shares(), self.pool.total_share_supply());
            for order in self.pool.order_book().iter().filter(|o| o.is_buy()) {
                assert_eq!(
                    Ok(order.escrow),
                    self.pool.tax_rate().gross(order.price, order.remaining_amount)
                );
            }

            // the payment asset cannot be pooled, so escrow and curve proceeds are all it holds
            let proceeds = self.pool.curve().map_or(0, BondingCurve::proceeds);
            assert_eq!(
                self.ledger.balance_of(self.pool.payment_asset(), self.pool.address()),
                self.pool.order_book().escrowed_payment() + proceeds
            );
        }
    }

    #[test]
    fn new_pool_renders_symbol_as_percentage() {
        let fx = Fixture::new();
        assert_eq!(fx.pool.symbol(), "% TST");
        assert_eq!(fx.pool.state(), PoolState::Created);
        assert_eq!(fx.pool.total_share_supply(), 0);
    }

    #[test]
    fn initialize_credits_scaled_supply_to_owner() {
        let fx = Fixture::initialized(100, 2);
        assert_eq!(fx.pool.total_share_supply(), 10_000);
        assert_eq!(fx.pool.share_balance(&fx.owner), 10_000);
        assert_eq!(fx.pool.state(), PoolState::Initialized);
    }

    #[test]
    fn initialize_twice_is_a_state_violation() {
        let mut fx = Fixture::initialized(0, 0);
        let owner = fx.owner.clone();
        let result = fx.pool.initialize(&owner, InitParams::default());
        assert_eq!(
            result,
            Err(PoolError::InvalidState {
                operation: Operation::Initialize,
                state: PoolState::Initialized
            })
        );
    }

    #[test]
    fn owner_check_precedes_state_check() {
        let mut fx = Fixture::initialized(0, 0);
        let alice = fx.alice.clone();
        assert_eq!(
            fx.pool.initialize(&alice, InitParams::default()),
            Err(PoolError::NotOwner)
        );
    }

    #[test]
    fn initialize_rejects_bad_parameters() {
        let mut fx = Fixture::new();
        let owner = fx.owner.clone();
        let params = InitParams {
            tax_rate: 1_001,
            ..InitParams::default()
        };
        assert_eq!(
            fx.pool.initialize(&owner, params),
            Err(PoolError::InvalidTaxRate(1_001))
        );
        let params = InitParams {
            share_precision: MAX_SHARE_PRECISION + 1,
            ..InitParams::default()
        };
        assert_eq!(
            fx.pool.initialize(&owner, params),
            Err(PoolError::InvalidPrecision(MAX_SHARE_PRECISION + 1))
        );
        assert_eq!(fx.pool.state(), PoolState::Created);
    }

    #[test]
    fn add_asset_accumulates_and_rejects_payment_asset() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 60);
        fx.deposit("T1", 40);
        assert_eq!(fx.pool.assets().len(), 1);
        assert_eq!(fx.pool.assets().first().map(|a| a.amount), Some(100));
        assert_eq!(fx.balance("T1", fx.pool.address()), 100);

        let owner = fx.owner.clone();
        let result = fx
            .pool
            .add_asset(&mut fx.ledger, &owner, &TokenId::from(PAY), 10);
        assert_eq!(result, Err(PoolError::PaymentAssetNotAllowed));
    }

    #[test]
    fn add_asset_by_stranger_is_rejected() {
        let mut fx = Fixture::new();
        let alice = fx.alice.clone();
        let result = fx
            .pool
            .add_asset(&mut fx.ledger, &alice, &TokenId::from("T1"), 1);
        assert_eq!(result, Err(PoolError::NotOwner));
    }

    #[test]
    fn add_asset_after_initialize_leaves_assets_unchanged() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 100);
        let owner = fx.owner.clone();
        let Ok(_) = fx.pool.initialize(&owner, InitParams::default()) else {
            panic!("initialize failed");
        };
        let Ok(_) = fx.ledger.mint(&TokenId::from("T2"), &owner, 10) else {
            panic!("mint failed");
        };
        let before = fx.pool.assets().to_vec();

        let result = fx
            .pool
            .add_asset(&mut fx.ledger, &owner, &TokenId::from("T2"), 10);
        assert_eq!(
            result,
            Err(PoolError::InvalidState {
                operation: Operation::AddAsset,
                state: PoolState::Initialized
            })
        );
        assert_eq!(fx.pool.assets(), before.as_slice());
        assert_eq!(fx.balance("T2", &owner), 10);
    }

    #[test]
    fn partial_accept_of_sell_order() {
        let mut fx = Fixture::initialized(100, 2);
        let (owner, bob) = (fx.owner.clone(), fx.bob.clone());

        let Ok(order) = fx.pool.sell(&owner, 10, 5_000) else {
            panic!("sell failed");
        };
        assert_eq!(order.escrow, 0);
        assert_eq!(fx.pool.share_balance(&owner), 5_000);
        fx.assert_accounting();

        let Ok(fill) = fx.pool.accept(&mut fx.ledger, &bob, &owner, 3_000) else {
            panic!("accept failed");
        };
        assert_eq!(fill.order.remaining_amount, 2_000);
        assert_eq!(fill.value, 30_000);
        assert_eq!(fill.tax, 3_000);
        assert_eq!(fx.pool.share_balance(&bob), 3_000);
        assert_eq!(fx.pool.order(order.index).map(|o| o.remaining_amount), Some(2_000));
        // owner is both seller and tax recipient
        assert_eq!(fx.pay(&owner), 1_000 + 30_000 + 3_000);
        assert_eq!(fx.pay(&bob), 100_000 - 33_000);
        assert_eq!(fx.pay(fx.pool.address()), 0);
        fx.assert_accounting();
    }

    #[test]
    fn full_accept_removes_order() {
        let mut fx = Fixture::initialized(0, 0);
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        let Ok(_) = fx.pool.sell(&owner, 7, 40) else {
            panic!("sell failed");
        };
        let Ok(fill) = fx.pool.accept(&mut fx.ledger, &alice, &owner, 40) else {
            panic!("accept failed");
        };
        assert!(fill.closed_order());
        assert!(fx.pool.orders().is_empty());
        assert!(fx.pool.order_of(&owner).is_none());
        fx.assert_accounting();
    }

    #[test]
    fn buy_escrows_gross_and_cancel_refunds_it() {
        let mut fx = Fixture::initialized(100, 2);
        let alice = fx.alice.clone();

        let Ok(order) = fx.pool.buy(&mut fx.ledger, &alice, 10, 100) else {
            panic!("buy failed");
        };
        assert_eq!(order.escrow, 1_100);
        assert_eq!(fx.pay(&alice), 100_000 - 1_100);
        assert_eq!(fx.pay(fx.pool.address()), 1_100);
        fx.assert_accounting();

        let Ok(cancelled) = fx.pool.cancel(&mut fx.ledger, &alice) else {
            panic!("cancel failed");
        };
        assert_eq!(cancelled.escrow, 1_100);
        assert_eq!(fx.pay(&alice), 100_000);
        assert_eq!(fx.pay(fx.pool.address()), 0);
        assert!(fx.pool.orders().is_empty());
    }

    #[test]
    fn accept_of_buy_order_releases_escrow() {
        let mut fx = Fixture::initialized(100, 2);
        let (owner, alice, bob) = (fx.owner.clone(), fx.alice.clone(), fx.bob.clone());
        assert!(fx.pool.transfer(&owner, &bob, 100).is_ok());
        let Ok(order) = fx.pool.buy(&mut fx.ledger, &alice, 10, 100) else {
            panic!("buy failed");
        };

        let Ok(fill) = fx.pool.accept(&mut fx.ledger, &bob, &alice, 40) else {
            panic!("accept failed");
        };
        assert_eq!(fill.value, 400);
        assert_eq!(fill.tax, 40);
        assert_eq!(fill.order.escrow, 660);
        assert_eq!(fx.pool.share_balance(&alice), 40);
        assert_eq!(fx.pool.share_balance(&bob), 60);
        assert_eq!(fx.pay(&bob), 100_000 + 400);
        assert_eq!(fx.pay(&owner), 1_000 + 40);
        assert_eq!(fx.pay(fx.pool.address()), 660);
        assert_eq!(fx.pool.order(order.index).map(|o| o.escrow), Some(660));
        fx.assert_accounting();
    }

    #[test]
    fn second_order_requires_cancel_first() {
        let mut fx = Fixture::initialized(0, 0);
        let owner = fx.owner.clone();
        let Ok(_) = fx.pool.sell(&owner, 1, 10) else {
            panic!("sell failed");
        };
        assert_eq!(fx.pool.sell(&owner, 1, 10), Err(PoolError::ActiveOrder));
        assert_eq!(
            fx.pool.buy(&mut fx.ledger, &owner, 1, 1),
            Err(PoolError::ActiveOrder)
        );
    }

    #[test]
    fn sell_beyond_balance_is_rejected() {
        let mut fx = Fixture::initialized(0, 0);
        let alice = fx.alice.clone();
        assert_eq!(
            fx.pool.sell(&alice, 1, 1),
            Err(PoolError::InsufficientShares {
                required: 1,
                available: 0
            })
        );
        assert!(fx.pool.orders().is_empty());
    }

    #[test]
    fn overfill_and_self_trade_are_rejected() {
        let mut fx = Fixture::initialized(0, 0);
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        let Ok(_) = fx.pool.sell(&owner, 1, 10) else {
            panic!("sell failed");
        };
        assert_eq!(
            fx.pool.accept(&mut fx.ledger, &alice, &owner, 11),
            Err(PoolError::InsufficientAmount {
                requested: 11,
                remaining: 10
            })
        );
        assert_eq!(
            fx.pool.accept(&mut fx.ledger, &owner, &owner, 1),
            Err(PoolError::SelfTrade)
        );
        assert!(matches!(
            fx.pool.accept(&mut fx.ledger, &owner, &alice, 1),
            Err(PoolError::NoActiveOrder(_))
        ));
    }

    #[test]
    fn failed_accept_leaves_everything_untouched() {
        let mut fx = Fixture::initialized(100, 0);
        let owner = fx.owner.clone();
        let poor = AccountId::from("poor");
        let Ok(_) = fx.ledger.mint(&TokenId::from(PAY), &poor, 50) else {
            panic!("mint failed");
        };
        let Ok(_) = fx.pool.sell(&owner, 10, 10) else {
            panic!("sell failed");
        };
        let pool_before = fx.pool.clone();
        let owner_pay = fx.pay(&owner);

        let result = fx.pool.accept(&mut fx.ledger, &poor, &owner, 5);
        assert!(matches!(
            result,
            Err(PoolError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        assert_eq!(fx.pool, pool_before);
        assert_eq!(fx.pay(&poor), 50);
        assert_eq!(fx.pay(&owner), owner_pay);
    }

    #[test]
    fn cancel_without_order_fails() {
        let mut fx = Fixture::initialized(0, 0);
        let alice = fx.alice.clone();
        assert!(matches!(
            fx.pool.cancel(&mut fx.ledger, &alice),
            Err(PoolError::NoActiveOrder(_))
        ));
    }

    #[test]
    fn trading_is_closed_outside_initialized() {
        let mut fx = Fixture::new();
        let owner = fx.owner.clone();
        assert!(matches!(
            fx.pool.sell(&owner, 1, 1),
            Err(PoolError::InvalidState { .. })
        ));
        assert!(matches!(
            fx.pool.withdraw(&mut fx.ledger, &owner),
            Err(PoolError::InvalidState { .. })
        ));
    }

    #[test]
    fn pro_rata_withdrawal() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 100);
        fx.deposit("T2", 50);
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        let Ok(_) = fx.pool.initialize(&owner, InitParams::default()) else {
            panic!("initialize failed");
        };
        assert!(fx.pool.transfer(&owner, &alice, 50).is_ok());
        let Ok(_) = fx.pool.terminate(&mut fx.ledger, &owner) else {
            panic!("terminate failed");
        };

        for holder in [&owner, &alice] {
            let Ok(withdrawal) = fx.pool.withdraw(&mut fx.ledger, holder) else {
                panic!("withdraw failed for {holder}");
            };
            assert_eq!(withdrawal.shares, 50);
            assert_eq!(fx.balance("T1", holder), 50);
            assert_eq!(fx.balance("T2", holder), 25);
        }
        assert_eq!(
            fx.pool.withdraw(&mut fx.ledger, &alice),
            Err(PoolError::NoSharesAvailable)
        );
        assert!(fx.pool.assets().iter().all(|a| a.amount == 0));
    }

    #[test]
    fn withdrawal_residual_is_bounded_by_rounding() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 10);
        let (owner, alice, bob) = (fx.owner.clone(), fx.alice.clone(), fx.bob.clone());
        let Ok(_) = fx.pool.initialize(&owner, InitParams::default()) else {
            panic!("initialize failed");
        };
        assert!(fx.pool.transfer(&owner, &alice, 33).is_ok());
        assert!(fx.pool.transfer(&owner, &bob, 33).is_ok());
        let Ok(_) = fx.pool.terminate(&mut fx.ledger, &owner) else {
            panic!("terminate failed");
        };

        for holder in [&owner, &alice, &bob] {
            assert!(fx.pool.withdraw(&mut fx.ledger, holder).is_ok());
        }
        // 34 -> 3, 33 -> 3, 33 -> 3
        let residual = fx.pool.assets().first().map_or(0, |a| a.amount);
        assert_eq!(residual, 1);
        assert!(residual <= 2);
    }

    #[test]
    fn cancel_after_terminate_returns_shares_for_withdrawal() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 100);
        let owner = fx.owner.clone();
        let Ok(_) = fx.pool.initialize(&owner, InitParams::default()) else {
            panic!("initialize failed");
        };
        let Ok(_) = fx.pool.sell(&owner, 1, 100) else {
            panic!("sell failed");
        };
        let Ok(_) = fx.pool.terminate(&mut fx.ledger, &owner) else {
            panic!("terminate failed");
        };
        assert_eq!(
            fx.pool.withdraw(&mut fx.ledger, &owner),
            Err(PoolError::NoSharesAvailable)
        );
        assert!(fx.pool.cancel(&mut fx.ledger, &owner).is_ok());
        assert!(fx.pool.withdraw(&mut fx.ledger, &owner).is_ok());
        assert_eq!(fx.balance("T1", &owner), 100);
    }

    #[test]
    fn abort_refunds_deposits() {
        let mut fx = Fixture::new();
        fx.deposit("T1", 70);
        let owner = fx.owner.clone();
        let Ok(refunds) = fx.pool.abort(&mut fx.ledger, &owner) else {
            panic!("abort failed");
        };
        assert_eq!(
            refunds,
            vec![Payout {
                token: TokenId::from("T1"),
                amount: 70
            }]
        );
        assert_eq!(fx.balance("T1", &owner), 70);
        assert_eq!(fx.pool.state(), PoolState::Terminated);
        assert_eq!(
            fx.pool.withdraw(&mut fx.ledger, &owner),
            Err(PoolError::NoSharesAvailable)
        );
    }

    fn curve_fixture() -> Fixture {
        let mut fx = Fixture::new();
        let owner = fx.owner.clone();
        let params = InitParams {
            tax_rate: 100,
            share_precision: 0,
            bonding_reserve: Some(5_000),
        };
        let Ok(_) = fx.pool.initialize(&owner, params) else {
            panic!("initialize failed");
        };
        fx
    }

    #[test]
    fn bonding_curve_purchase_and_redeem() {
        let mut fx = curve_fixture();
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        assert_eq!(fx.pool.share_balance(&owner), 0);
        assert_eq!(fx.pool.quote_purchase(500), Ok(9));

        let Ok(trade) = fx.pool.purchase(&mut fx.ledger, &alice, 500, 9) else {
            panic!("purchase failed");
        };
        assert_eq!(trade.shares, 9);
        assert_eq!(trade.tax, 50);
        assert_eq!(fx.pool.reserves(), Some((91, 5_500)));
        assert_eq!(fx.pay(&alice), 100_000 - 550);
        assert_eq!(fx.pay(&owner), 1_000 + 50);
        fx.assert_accounting();

        let Ok(trade) = fx.pool.redeem(&mut fx.ledger, &alice, 9, 495) else {
            panic!("redeem failed");
        };
        assert_eq!(trade.payment, 495);
        assert_eq!(fx.pool.reserves(), Some((100, 5_005)));
        assert_eq!(fx.pay(&alice), 100_000 - 550 + 495);
        fx.assert_accounting();
    }

    #[test]
    fn bonding_curve_rejects_owner_and_slippage() {
        let mut fx = curve_fixture();
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        assert_eq!(
            fx.pool.purchase(&mut fx.ledger, &owner, 500, 0),
            Err(PoolError::OwnerNotAllowed)
        );
        assert_eq!(
            fx.pool.purchase(&mut fx.ledger, &alice, 500, 10),
            Err(PoolError::SlippageExceeded {
                minimum: 10,
                actual: 9
            })
        );
        assert_eq!(fx.pay(&alice), 100_000);
    }

    #[test]
    fn purchase_without_curve_is_rejected() {
        let mut fx = Fixture::initialized(0, 0);
        let alice = fx.alice.clone();
        assert_eq!(
            fx.pool.purchase(&mut fx.ledger, &alice, 500, 0),
            Err(PoolError::CurveDisabled)
        );
    }

    #[test]
    fn terminate_closes_curve_in_favour_of_owner() {
        let mut fx = curve_fixture();
        let (owner, alice) = (fx.owner.clone(), fx.alice.clone());
        let Ok(_) = fx.pool.purchase(&mut fx.ledger, &alice, 500, 0) else {
            panic!("purchase failed");
        };
        let owner_pay = fx.pay(&owner);

        let Ok(termination) = fx.pool.terminate(&mut fx.ledger, &owner) else {
            panic!("terminate failed");
        };
        assert_eq!(termination.curve_shares, 91);
        assert_eq!(termination.curve_proceeds, 500);
        assert_eq!(fx.pool.share_balance(&owner), 91);
        assert_eq!(fx.pay(&owner), owner_pay + 500);
        assert_eq!(fx.pool.quote_purchase(1), Err(PoolError::InvalidState {
            operation: Operation::Purchase,
            state: PoolState::Terminated,
        }));
        fx.assert_accounting();
    }

    #[test]
    fn terminated_pool_only_unwinds() {
        let mut fx = Fixture::initialized(100, 2);
        let (owner, alice, bob) = (fx.owner.clone(), fx.alice.clone(), fx.bob.clone());
        let Ok(_) = fx.pool.sell(&owner, 5, 200) else {
            panic!("sell failed");
        };
        let Ok(_) = fx.pool.buy(&mut fx.ledger, &alice, 10, 100) else {
            panic!("buy failed");
        };
        let Ok(_) = fx.pool.terminate(&mut fx.ledger, &owner) else {
            panic!("terminate failed");
        };

        let closed = |result: Result<(), PoolError>, operation: Operation| {
            assert_eq!(
                result,
                Err(PoolError::InvalidState {
                    operation,
                    state: PoolState::Terminated,
                })
            );
        };
        closed(fx.pool.sell(&owner, 5, 10).map(|_| ()), Operation::Sell);
        closed(
            fx.pool.buy(&mut fx.ledger, &bob, 10, 10).map(|_| ()),
            Operation::Buy,
        );
        closed(
            fx.pool.accept(&mut fx.ledger, &bob, &owner, 10).map(|_| ()),
            Operation::Accept,
        );
        closed(
            fx.pool
                .add_asset(&mut fx.ledger, &owner, &TokenId::from("T1"), 10)
                .map(|_| ()),
            Operation::AddAsset,
        );
        closed(
            fx.pool.terminate(&mut fx.ledger, &owner).map(|_| ()),
            Operation::Terminate,
        );
        fx.assert_accounting();

        assert!(fx.pool.transfer(&owner, &bob, 50).is_ok());
        assert_eq!(fx.pool.share_balance(&bob), 50);
        let Ok(refund) = fx.pool.cancel(&mut fx.ledger, &alice) else {
            panic!("cancel of buy failed");
        };
        assert_eq!(refund.escrow, 1_100);
        assert_eq!(fx.pay(&alice), 100_000);
        let Ok(_) = fx.pool.cancel(&mut fx.ledger, &owner) else {
            panic!("cancel of sell failed");
        };
        assert!(fx.pool.orders().is_empty());
        fx.assert_accounting();
    }
}
