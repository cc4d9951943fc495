//! Purchase request and result types

use meretrix_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// A request to buy `amount` units for `buyer`. Transient, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub buyer: AccountId,
    pub amount: Amount,
}

impl PurchaseRequest {
    pub fn new(buyer: AccountId, amount: Amount) -> Self {
        Self { buyer, amount }
    }
}

/// Outcome of an accepted purchase.
///
/// Only produced by [`crate::buy`]; fields are read-only so a result cannot
/// be altered between pricing and commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseResult {
    buyer: AccountId,
    amount: Amount,
    unit_price: Amount,
    cost: Amount,
    prior_sold_supply: Amount,
    new_sold_supply: Amount,
}

impl PurchaseResult {
    pub(crate) fn new(
        buyer: AccountId,
        amount: Amount,
        unit_price: Amount,
        cost: Amount,
        prior_sold_supply: Amount,
        new_sold_supply: Amount,
    ) -> Self {
        Self {
            buyer,
            amount,
            unit_price,
            cost,
            prior_sold_supply,
            new_sold_supply,
        }
    }

    pub fn buyer(&self) -> AccountId {
        self.buyer
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Unit price the purchase was charged at.
    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// Total owed by the buyer: `amount * unit_price`.
    pub fn cost(&self) -> Amount {
        self.cost
    }

    /// Sold count the purchase was priced against.
    pub fn prior_sold_supply(&self) -> Amount {
        self.prior_sold_supply
    }

    /// Sold count to commit once the purchase settles.
    pub fn new_sold_supply(&self) -> Amount {
        self.new_sold_supply
    }
}
