//! Supply state of a single issuance
//!
//! `total_supply` is fixed when the issuance is created; `sold_supply` only
//! grows, through committed purchases.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// Snapshot of how much of the float has been sold.
///
/// Invariant: `sold_supply <= total_supply`. The fields are public so callers
/// can hand in persisted state; the issuance engine re-checks the invariant on
/// every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplyState {
    pub total_supply: Amount,
    pub sold_supply: Amount,
}

impl SupplyState {
    /// Fresh state with nothing sold.
    pub const fn new(total_supply: Amount) -> Self {
        Self {
            total_supply,
            sold_supply: 0,
        }
    }

    pub const fn from_parts(total_supply: Amount, sold_supply: Amount) -> Self {
        Self {
            total_supply,
            sold_supply,
        }
    }

    /// Whether `sold_supply <= total_supply` holds.
    pub const fn is_consistent(&self) -> bool {
        self.sold_supply <= self.total_supply
    }

    /// Units still available for sale (the treasury).
    ///
    /// Saturates at zero for an inconsistent state.
    pub const fn remaining(&self) -> Amount {
        self.total_supply.saturating_sub(self.sold_supply)
    }

    pub const fn is_sold_out(&self) -> bool {
        self.sold_supply >= self.total_supply
    }
}
