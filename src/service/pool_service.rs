//! Pool service: orchestrates pool operations and emits events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::pool_entry::{PoolEntry, PoolSummary};
use crate::domain::pool_event::{PoolEvent, TokenAmount};
use crate::domain::{EventBus, PoolId, PoolRegistry};
use crate::engine::{
    AccountId, Asset, AssetLedger, CurveTrade, Fill, InMemoryLedger, InitParams, Order, OrderSide,
    Payout, PoolError, PoolFactory, PoolState, SharePool, Termination, TokenId, Withdrawal,
};
use crate::error::GatewayError;

/// Display name of the fee-collecting root pool.
pub const ROOT_POOL_NAME: &str = "Root";

/// Share symbol of the root pool.
pub const ROOT_POOL_SYMBOL: &str = "ROOT";

/// Owner, issue fee, fee token and beneficiary of the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryFee {
    /// Account allowed to change the settings.
    pub owner: AccountId,
    /// Fee charged per issued pool.
    pub issue_fee: u128,
    /// Token the fee is paid in.
    pub fee_token: TokenId,
    /// Account receiving the fee; no fee is charged while unset.
    pub beneficiary: Option<AccountId>,
}

/// Orchestration layer for all pool operations.
///
/// Owns references to the [`PoolRegistry`] for pool state, the shared
/// [`InMemoryLedger`] for token balances, the [`PoolFactory`] for issuance
/// and the [`EventBus`] for event emission. Every mutation follows the
/// pattern: lock pool entry → lock ledger → call the engine → update
/// metadata → release locks → emit events.
#[derive(Debug, Clone)]
pub struct PoolService {
    registry: Arc<PoolRegistry>,
    event_bus: EventBus,
    ledger: Arc<Mutex<InMemoryLedger>>,
    factory: Arc<RwLock<PoolFactory>>,
}

impl PoolService {
    /// Creates a new `PoolService`.
    #[must_use]
    pub fn new(
        registry: Arc<PoolRegistry>,
        event_bus: EventBus,
        ledger: InMemoryLedger,
        factory: PoolFactory,
    ) -> Self {
        Self {
            registry,
            event_bus,
            ledger: Arc::new(Mutex::new(ledger)),
            factory: Arc::new(RwLock::new(factory)),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PoolRegistry`].
    #[must_use]
    pub const fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    // ---------------------------------------------------------------------
    // Factory
    // ---------------------------------------------------------------------

    /// Issues a new pool owned by `owner`, charging the factory fee.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the owner cannot pay the issue fee.
    pub async fn issue_pool(
        &self,
        owner: AccountId,
        payment_asset: TokenId,
        name: &str,
        symbol: &str,
    ) -> Result<PoolId, GatewayError> {
        let pool_id = PoolId::new();

        let factory = self.factory.read().await;
        let fee_paid = match factory.fee() {
            (fee, Some(_)) => fee,
            (_, None) => 0,
        };
        // the fee and the new entry land together for snapshots
        let slot = self.registry.reserve().await;
        let pool = {
            let mut ledger = self.ledger.lock().await;
            factory.issue(
                &mut *ledger,
                pool_id.account(),
                owner,
                payment_asset,
                name,
                symbol,
            )?
        };
        drop(factory);

        let event = issued_event(pool_id, &pool, fee_paid);
        slot.insert(PoolEntry::new(pool_id, pool))?;
        let _ = self.event_bus.publish(event);

        tracing::info!(%pool_id, name, fee_paid, "pool issued");
        Ok(pool_id)
    }

    /// Issues the fee-free root pool of `owner` and makes it the factory
    /// beneficiary. A root pool restored from a snapshot is reused.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the registry rejects the new pool.
    pub async fn bootstrap_root_pool(
        &self,
        owner: AccountId,
        payment_asset: TokenId,
    ) -> Result<PoolId, GatewayError> {
        let existing = self
            .registry
            .list(None)
            .await
            .into_iter()
            .find(|summary| summary.owner == owner && summary.name == ROOT_POOL_NAME)
            .map(|summary| summary.pool_id);

        let pool_id = if let Some(pool_id) = existing {
            pool_id
        } else {
            let pool_id = PoolId::new();
            let pool = SharePool::new(
                pool_id.account(),
                owner,
                payment_asset,
                ROOT_POOL_NAME,
                ROOT_POOL_SYMBOL,
            );
            let event = issued_event(pool_id, &pool, 0);
            self.registry.insert(PoolEntry::new(pool_id, pool)).await?;
            let _ = self.event_bus.publish(event);
            pool_id
        };

        {
            let mut factory = self.factory.write().await;
            let admin = factory.owner().clone();
            factory.set_beneficiary(&admin, Some(pool_id.account()))?;
        }
        tracing::info!(%pool_id, reused = existing.is_some(), "root pool ready");
        Ok(pool_id)
    }

    /// Current factory fee settings.
    pub async fn factory_fee(&self) -> FactoryFee {
        let factory = self.factory.read().await;
        let (issue_fee, beneficiary) = factory.fee();
        FactoryFee {
            owner: factory.owner().clone(),
            issue_fee,
            fee_token: factory.fee_token().clone(),
            beneficiary: beneficiary.cloned(),
        }
    }

    /// Replaces the factory issue fee.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotOwner`] unless `caller` owns the factory.
    pub async fn set_issue_fee(
        &self,
        caller: &AccountId,
        issue_fee: u128,
    ) -> Result<(), GatewayError> {
        self.factory.write().await.set_fee(caller, issue_fee)?;
        tracing::info!(%caller, issue_fee, "factory fee updated");
        Ok(())
    }

    /// Replaces the account receiving issue fees. `None` disables the fee.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotOwner`] unless `caller` owns the factory.
    pub async fn set_beneficiary(
        &self,
        caller: &AccountId,
        beneficiary: Option<AccountId>,
    ) -> Result<(), GatewayError> {
        self.factory
            .write()
            .await
            .set_beneficiary(caller, beneficiary.clone())?;
        tracing::info!(%caller, beneficiary = ?beneficiary, "factory beneficiary updated");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------------

    /// Deposits `amount` of `token` from the owner into the pool.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the deposit
    /// is rejected.
    pub async fn add_asset(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        token: &TokenId,
        amount: u128,
    ) -> Result<Asset, GatewayError> {
        let asset = self
            .with_pool(pool_id, |entry, ledger| {
                entry.pool.add_asset(ledger, caller, token, amount)
            })
            .await?;

        let _ = self.event_bus.publish(PoolEvent::AssetAdded {
            pool_id,
            token: token.to_string(),
            amount: amount.to_string(),
            total: asset.amount.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, %token, amount, "asset added");
        Ok(asset)
    }

    /// Fixes tax, precision and supply, opening the pool for trading.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the
    /// parameters are rejected.
    pub async fn initialize(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        params: InitParams,
    ) -> Result<u128, GatewayError> {
        let total_supply = self
            .with_pool(pool_id, |entry, _| entry.pool.initialize(caller, params))
            .await?;

        let _ = self.event_bus.publish(PoolEvent::PoolInitialized {
            pool_id,
            total_share_supply: total_supply.to_string(),
            tax_rate: params.tax_rate,
            share_precision: params.share_precision,
            bonding: params.bonding_reserve.is_some(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, total_supply, tax_rate = params.tax_rate, "pool initialized");
        Ok(total_supply)
    }

    /// Refunds every deposit to the owner of a pool that never initialized.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or not abortable.
    pub async fn abort(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
    ) -> Result<Vec<Payout>, GatewayError> {
        let refunds = self
            .with_pool(pool_id, |entry, ledger| entry.pool.abort(ledger, caller))
            .await?;

        let _ = self.event_bus.publish(PoolEvent::PoolAborted {
            pool_id,
            refunds: refunds.iter().map(TokenAmount::from).collect(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, assets = refunds.len(), "pool aborted");
        Ok(refunds)
    }

    // ---------------------------------------------------------------------
    // Order book
    // ---------------------------------------------------------------------

    /// Opens a sell order for the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the order is
    /// rejected.
    pub async fn sell(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        price: u128,
        amount: u128,
    ) -> Result<Order, GatewayError> {
        let order = self
            .with_pool(pool_id, |entry, _| entry.pool.sell(caller, price, amount))
            .await?;
        self.publish_opened(pool_id, &order);
        Ok(order)
    }

    /// Opens a buy order for the caller, escrowing the gross cost.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the order is
    /// rejected.
    pub async fn buy(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        price: u128,
        amount: u128,
    ) -> Result<Order, GatewayError> {
        let order = self
            .with_pool(pool_id, |entry, ledger| {
                entry.pool.buy(ledger, caller, price, amount)
            })
            .await?;
        self.publish_opened(pool_id, &order);
        Ok(order)
    }

    /// Fills `amount` of the open order of `counterparty`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the fill is
    /// rejected.
    pub async fn accept(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        counterparty: &AccountId,
        amount: u128,
    ) -> Result<Fill, GatewayError> {
        let fill = self
            .with_pool(pool_id, |entry, ledger| {
                let fill = entry.pool.accept(ledger, caller, counterparty, amount)?;
                entry.record_trade(fill.value);
                Ok(fill)
            })
            .await?;

        let _ = self.event_bus.publish(PoolEvent::OrderFilled {
            pool_id,
            index: fill.order.index,
            maker: fill.order.account.to_string(),
            taker: fill.taker.to_string(),
            side: fill.order.side,
            amount: fill.amount.to_string(),
            remaining: fill.order.remaining_amount.to_string(),
            value: fill.value.to_string(),
            tax: fill.tax.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            %pool_id,
            index = fill.order.index,
            amount = fill.amount,
            value = fill.value,
            closed = fill.closed_order(),
            "order filled"
        );
        Ok(fill)
    }

    /// Cancels the caller's open order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller has
    /// no open order.
    pub async fn cancel(&self, pool_id: PoolId, caller: &AccountId) -> Result<Order, GatewayError> {
        let order = self
            .with_pool(pool_id, |entry, ledger| entry.pool.cancel(ledger, caller))
            .await?;

        let (shares_returned, escrow_refunded) = match order.side {
            OrderSide::Sell => (order.remaining_amount, 0),
            OrderSide::Buy => (0, order.escrow),
        };
        let _ = self.event_bus.publish(PoolEvent::OrderCancelled {
            pool_id,
            index: order.index,
            account: order.account.to_string(),
            side: order.side,
            shares_returned: shares_returned.to_string(),
            escrow_refunded: escrow_refunded.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, index = order.index, "order cancelled");
        Ok(order)
    }

    /// Moves visible shares from the caller to `to`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the transfer
    /// is rejected.
    pub async fn transfer(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), GatewayError> {
        self.with_pool(pool_id, |entry, _| entry.pool.transfer(caller, to, amount))
            .await?;

        let _ = self.event_bus.publish(PoolEvent::SharesTransferred {
            pool_id,
            from: caller.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, from = %caller, %to, amount, "shares transferred");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Bonding curve
    // ---------------------------------------------------------------------

    /// Buys shares from the bonding reserve.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the purchase
    /// is rejected.
    pub async fn purchase(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        payment_in: u128,
        min_shares_out: u128,
    ) -> Result<CurveTrade, GatewayError> {
        let trade = self
            .with_pool(pool_id, |entry, ledger| {
                let trade = entry
                    .pool
                    .purchase(ledger, caller, payment_in, min_shares_out)?;
                entry.record_trade(trade.payment);
                Ok(trade)
            })
            .await?;
        self.publish_curve_trade(pool_id, &trade);
        Ok(trade)
    }

    /// Sells shares back to the bonding reserve.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the redemption
    /// is rejected.
    pub async fn redeem(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        shares_in: u128,
        min_payment_out: u128,
    ) -> Result<CurveTrade, GatewayError> {
        let trade = self
            .with_pool(pool_id, |entry, ledger| {
                let trade = entry
                    .pool
                    .redeem(ledger, caller, shares_in, min_payment_out)?;
                entry.record_trade(trade.payment);
                Ok(trade)
            })
            .await?;
        self.publish_curve_trade(pool_id, &trade);
        Ok(trade)
    }

    /// Shares a purchase of `payment_in` would yield. Never mutates.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or has no open
    /// bonding curve.
    pub async fn quote_purchase(
        &self,
        pool_id: PoolId,
        payment_in: u128,
    ) -> Result<u128, GatewayError> {
        self.read_pool(pool_id, |entry| entry.pool.quote_purchase(payment_in))
            .await?
            .map_err(GatewayError::from)
    }

    /// Payment a redemption of `shares_in` would yield. Never mutates.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or has no open
    /// bonding curve.
    pub async fn quote_redeem(&self, pool_id: PoolId, shares_in: u128) -> Result<u128, GatewayError> {
        self.read_pool(pool_id, |entry| entry.pool.quote_redeem(shares_in))
            .await?
            .map_err(GatewayError::from)
    }

    // ---------------------------------------------------------------------
    // Wind-down
    // ---------------------------------------------------------------------

    /// Ends trading and fixes every asset's settlement amount.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or cannot be
    /// terminated.
    pub async fn terminate(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
    ) -> Result<Termination, GatewayError> {
        let termination = self
            .with_pool(pool_id, |entry, ledger| entry.pool.terminate(ledger, caller))
            .await?;

        let _ = self.event_bus.publish(PoolEvent::PoolTerminated {
            pool_id,
            settlement: termination.settlement.iter().map(TokenAmount::from).collect(),
            curve_shares: termination.curve_shares.to_string(),
            curve_proceeds: termination.curve_proceeds.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, assets = termination.settlement.len(), "pool terminated");
        Ok(termination)
    }

    /// Pays the caller their pro-rata slice of every asset.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found, not terminated,
    /// or the caller holds no shares.
    pub async fn withdraw(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
    ) -> Result<Withdrawal, GatewayError> {
        let withdrawal = self
            .with_pool(pool_id, |entry, ledger| entry.pool.withdraw(ledger, caller))
            .await?;

        let _ = self.event_bus.publish(PoolEvent::Withdrawn {
            pool_id,
            account: withdrawal.account.to_string(),
            shares: withdrawal.shares.to_string(),
            payouts: withdrawal.payouts.iter().map(TokenAmount::from).collect(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, account = %caller, shares = withdrawal.shares, "shares withdrawn");
        Ok(withdrawal)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Returns a copy of the pool entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn get_pool(&self, pool_id: PoolId) -> Result<PoolEntry, GatewayError> {
        self.read_pool(pool_id, PoolEntry::clone).await
    }

    /// Lists pool summaries, optionally filtered by state.
    pub async fn list_pools(&self, state: Option<PoolState>) -> Vec<PoolSummary> {
        self.registry.list(state).await
    }

    /// Open orders of the pool, by ascending index.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn orders(&self, pool_id: PoolId) -> Result<Vec<Order>, GatewayError> {
        self.read_pool(pool_id, |entry| {
            entry.pool.order_book().iter().cloned().collect()
        })
        .await
    }

    /// Open order at `index`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool or the order does not exist.
    pub async fn order(&self, pool_id: PoolId, index: usize) -> Result<Order, GatewayError> {
        self.read_pool(pool_id, |entry| entry.pool.order(index).cloned())
            .await?
            .ok_or(GatewayError::Pool(PoolError::OrderNotFound(index)))
    }

    /// Visible share balance of `account`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn share_balance(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<u128, GatewayError> {
        self.read_pool(pool_id, |entry| entry.pool.share_balance(account))
            .await
    }

    /// Registered assets with their pooled and settlement amounts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn assets(&self, pool_id: PoolId) -> Result<Vec<Asset>, GatewayError> {
        self.read_pool(pool_id, |entry| entry.pool.assets().to_vec())
            .await
    }

    // ---------------------------------------------------------------------
    // Ledger
    // ---------------------------------------------------------------------

    /// Credits freshly minted tokens to `account`; returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the balance would overflow.
    pub async fn mint(
        &self,
        token: &TokenId,
        account: &AccountId,
        amount: u128,
    ) -> Result<u128, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidRequest(
                "mint amount must be positive".to_string(),
            ));
        }
        let balance = self.ledger.lock().await.mint(token, account, amount)?;
        tracing::info!(%token, %account, amount, "tokens minted");
        Ok(balance)
    }

    /// Balance of `token` held by `account`.
    pub async fn balance_of(&self, token: &TokenId, account: &AccountId) -> u128 {
        self.ledger.lock().await.balance_of(token, account)
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Copies every pool entry and the token ledger as of one instant.
    ///
    /// All entries stay read-locked while the ledger is cloned, so no
    /// operation is half visible in the copy.
    pub async fn snapshot(&self) -> (Vec<PoolEntry>, InMemoryLedger) {
        let frozen = self.registry.freeze().await;
        let ledger = self.ledger.lock().await.clone();
        let entries = frozen.entries();
        drop(frozen);
        (entries, ledger)
    }

    /// Loads restored entries and, when present, the restored ledger.
    pub async fn restore(&self, entries: Vec<PoolEntry>, ledger: Option<InMemoryLedger>) {
        let restored = entries.len();
        for entry in entries {
            self.registry.upsert(entry).await;
        }
        if let Some(ledger) = ledger {
            *self.ledger.lock().await = ledger;
        }
        tracing::info!(restored, "pools restored");
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Runs `op` under the pool's write lock and the ledger lock, touching
    /// the entry on success.
    async fn with_pool<T>(
        &self,
        pool_id: PoolId,
        op: impl FnOnce(&mut PoolEntry, &mut InMemoryLedger) -> Result<T, PoolError>,
    ) -> Result<T, GatewayError> {
        let entry_lock = self.registry.get(pool_id).await?;
        let mut entry = entry_lock.write().await;
        let mut ledger = self.ledger.lock().await;
        let result = op(&mut *entry, &mut *ledger)?;
        entry.touch();
        Ok(result)
    }

    async fn read_pool<T>(
        &self,
        pool_id: PoolId,
        f: impl FnOnce(&PoolEntry) -> T,
    ) -> Result<T, GatewayError> {
        let entry_lock = self.registry.get(pool_id).await?;
        let entry = entry_lock.read().await;
        Ok(f(&*entry))
    }

    fn publish_opened(&self, pool_id: PoolId, order: &Order) {
        let _ = self.event_bus.publish(PoolEvent::OrderOpened {
            pool_id,
            index: order.index,
            account: order.account.to_string(),
            side: order.side,
            price: order.price.to_string(),
            amount: order.remaining_amount.to_string(),
            escrow: order.escrow.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            %pool_id,
            index = order.index,
            side = ?order.side,
            price = order.price,
            amount = order.remaining_amount,
            "order opened"
        );
    }

    fn publish_curve_trade(&self, pool_id: PoolId, trade: &CurveTrade) {
        let _ = self.event_bus.publish(PoolEvent::CurveTraded {
            pool_id,
            account: trade.account.to_string(),
            side: trade.side,
            shares: trade.shares.to_string(),
            payment: trade.payment.to_string(),
            tax: trade.tax.to_string(),
            reserve_shares: trade.reserve_shares.to_string(),
            reserve_payment: trade.reserve_payment.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            %pool_id,
            side = ?trade.side,
            shares = trade.shares,
            payment = trade.payment,
            "curve trade"
        );
    }
}

fn issued_event(pool_id: PoolId, pool: &SharePool, fee_paid: u128) -> PoolEvent {
    PoolEvent::PoolIssued {
        pool_id,
        owner: pool.owner().to_string(),
        payment_asset: pool.payment_asset().to_string(),
        name: pool.name().to_string(),
        symbol: pool.symbol().to_string(),
        fee_paid: fee_paid.to_string(),
        timestamp: Utc::now(),
    }
}
