//! Pool lifecycle states and the operation permission table.
//!
//! A pool only ever advances `Created -> Initialized -> Terminated`. Which
//! operations are legal in each state is a static property of the
//! [`Operation`] itself, checked once at the entry of every pool call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Accepting asset deposits; no shares exist yet.
    Created,
    /// Share supply fixed; trading is open.
    Initialized,
    /// Wound down; shareholders withdraw their pro-rata slice.
    Terminated,
}

impl PoolState {
    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every state-changing entry point of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Deposit a pooled asset.
    AddAsset,
    /// Fix supply, tax and precision.
    Initialize,
    /// Refund deposits and close a pool that never initialized.
    Abort,
    /// Open a sell order.
    Sell,
    /// Open a buy order.
    Buy,
    /// Fill part or all of another account's order.
    Accept,
    /// Close the caller's own order.
    Cancel,
    /// Move shares between accounts.
    Transfer,
    /// Buy shares from the bonding reserve.
    Purchase,
    /// Sell shares back to the bonding reserve.
    Redeem,
    /// Wind the pool down.
    Terminate,
    /// Claim the pro-rata asset slice.
    Withdraw,
}

const CREATED: &[PoolState] = &[PoolState::Created];
const INITIALIZED: &[PoolState] = &[PoolState::Initialized];
const TERMINATED: &[PoolState] = &[PoolState::Terminated];
const OPEN_OR_WOUND_DOWN: &[PoolState] = &[PoolState::Initialized, PoolState::Terminated];

impl Operation {
    /// States in which this operation may run.
    #[must_use]
    pub const fn permitted_states(self) -> &'static [PoolState] {
        match self {
            Self::AddAsset | Self::Initialize | Self::Abort => CREATED,
            Self::Sell
            | Self::Buy
            | Self::Accept
            | Self::Purchase
            | Self::Redeem
            | Self::Terminate => INITIALIZED,
            Self::Cancel | Self::Transfer => OPEN_OR_WOUND_DOWN,
            Self::Withdraw => TERMINATED,
        }
    }

    /// Returns `true` if the operation may run while the pool is in `state`.
    #[must_use]
    pub fn is_permitted_in(self, state: PoolState) -> bool {
        self.permitted_states().contains(&state)
    }

    /// Returns `true` if only the pool owner may invoke the operation.
    #[must_use]
    pub const fn is_owner_only(self) -> bool {
        matches!(
            self,
            Self::AddAsset | Self::Initialize | Self::Abort | Self::Terminate
        )
    }

    /// Returns the operation name as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddAsset => "add_asset",
            Self::Initialize => "initialize",
            Self::Abort => "abort",
            Self::Sell => "sell",
            Self::Buy => "buy",
            Self::Accept => "accept",
            Self::Cancel => "cancel",
            Self::Transfer => "transfer",
            Self::Purchase => "purchase",
            Self::Redeem => "redeem",
            Self::Terminate => "terminate",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
