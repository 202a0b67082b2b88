//! Order book: at most one open order per account.
//!
//! Orders live in an arena with stable indices. Removing an order frees its
//! slot onto a free list so later orders can reuse it without shifting any
//! other index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::error::PoolError;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    /// Wants shares, escrows payment asset.
    Buy,
    /// Offers shares, escrows the shares themselves.
    Sell,
}

impl OrderSide {
    /// Returns `true` for buy orders.
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }
}

/// An outstanding buy or sell intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Stable arena index.
    pub index: usize,
    /// Account that opened the order.
    pub account: AccountId,
    /// Buy or sell.
    pub side: OrderSide,
    /// Payment-asset units per share.
    pub price: u128,
    /// Unfilled share quantity.
    pub remaining_amount: u128,
    /// Payment asset held by the pool against the order (zero for sells).
    pub escrow: u128,
}

impl Order {
    /// Returns `true` for buy orders.
    #[must_use]
    pub const fn is_buy(&self) -> bool {
        self.side.is_buy()
    }
}

/// Indexed set of open orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    slots: Vec<Option<Order>>,
    free: Vec<usize>,
    by_account: BTreeMap<AccountId, usize>,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Order stored at `index`, if it is still open.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Order> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Open order of `account`, if any.
    #[must_use]
    pub fn order_of(&self, account: &AccountId) -> Option<&Order> {
        self.by_account
            .get(account)
            .and_then(|index| self.get(*index))
    }

    /// Indices of all open orders, ascending.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.iter().map(|order| order.index).collect()
    }

    /// Iterates over open orders in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of open orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_account.len()
    }

    /// Returns `true` if no order is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_account.is_empty()
    }

    /// Shares locked in open sell orders.
    #[must_use]
    pub fn locked_shares(&self) -> u128 {
        self.iter()
            .filter(|order| !order.is_buy())
            .fold(0u128, |acc, order| acc.saturating_add(order.remaining_amount))
    }

    /// Payment asset escrowed by open buy orders.
    #[must_use]
    pub fn escrowed_payment(&self) -> u128 {
        self.iter()
            .fold(0u128, |acc, order| acc.saturating_add(order.escrow))
    }

    pub(crate) fn open(
        &mut self,
        account: &AccountId,
        side: OrderSide,
        price: u128,
        amount: u128,
        escrow: u128,
    ) -> Result<Order, PoolError> {
        if self.by_account.contains_key(account) {
            return Err(PoolError::ActiveOrder);
        }

        let index = self.free.pop().unwrap_or(self.slots.len());
        let order = Order {
            index,
            account: account.clone(),
            side,
            price,
            remaining_amount: amount,
            escrow,
        };

        match self.slots.get_mut(index) {
            Some(slot) => *slot = Some(order.clone()),
            None => self.slots.push(Some(order.clone())),
        }
        self.by_account.insert(account.clone(), index);
        Ok(order)
    }

    /// Reduces the order at `index` by `amount` and sets its escrow.
    ///
    /// The order is removed once nothing remains. Returns the order as it
    /// stands after the fill.
    pub(crate) fn fill(
        &mut self,
        index: usize,
        amount: u128,
        escrow_after: u128,
    ) -> Result<Order, PoolError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(PoolError::OrderNotFound(index))?;
        let order = slot.as_mut().ok_or(PoolError::OrderNotFound(index))?;

        order.remaining_amount = order.remaining_amount.checked_sub(amount).ok_or(
            PoolError::InsufficientAmount {
                requested: amount,
                remaining: order.remaining_amount,
            },
        )?;
        order.escrow = escrow_after;
        let snapshot = order.clone();

        if snapshot.remaining_amount == 0 {
            *slot = None;
            self.by_account.remove(&snapshot.account);
            self.free.push(index);
        }
        Ok(snapshot)
    }

    /// Removes and returns the open order of `account`.
    pub(crate) fn remove(&mut self, account: &AccountId) -> Result<Order, PoolError> {
        let index = self
            .by_account
            .remove(account)
            .ok_or_else(|| PoolError::NoActiveOrder(account.to_string()))?;
        let order = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(PoolError::OrderNotFound(index))?;
        self.free.push(index);
        Ok(order)
    }
}
