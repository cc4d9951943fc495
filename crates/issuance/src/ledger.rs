//! Purchase validation and the supply state transition
//!
//! [`buy`] is a pure calculation over an explicit [`SupplyState`]. The
//! [`IssuanceLedger`] wraps one state and applies results to it; callers that
//! share a ledger across threads must serialize `commit`/`execute`.

use crate::errors::IssuanceError;
use crate::price::{price, price_of};
use crate::types::{PurchaseRequest, PurchaseResult};
use meretrix_types::{Amount, SupplyState, MAX_TOTAL_SUPPLY};
use serde::Serialize;
use tracing::{debug, info};

/// Price and validate a purchase against `state`.
///
/// Checks run in a fixed order: zero amount, supply invariant, cost
/// overflow, treasury availability. `state` is only read.
pub fn buy(
    request: &PurchaseRequest,
    state: &SupplyState,
) -> Result<PurchaseResult, IssuanceError> {
    if request.amount == 0 {
        debug!(target: "issuance", "Rejected zero-amount purchase for {:?}", request.buyer);
        return Err(IssuanceError::InvalidAmount);
    }

    let unit_price = price(state.total_supply, state.sold_supply)?;

    let cost = request
        .amount
        .checked_mul(unit_price)
        .ok_or(IssuanceError::ArithmeticOverflow("purchase cost"))?;

    let remaining = state.total_supply - state.sold_supply;
    if request.amount > remaining {
        debug!(
            target: "issuance",
            "Rejected purchase of {} units: only {} remaining",
            request.amount,
            remaining
        );
        return Err(IssuanceError::InsufficientTreasury {
            requested: request.amount,
            remaining,
        });
    }

    // amount <= remaining, so this stays within total_supply
    let new_sold_supply = state.sold_supply + request.amount;

    debug!(
        target: "issuance",
        "Quoted {} units at {} each (cost {}), sold {} -> {}",
        request.amount,
        unit_price,
        cost,
        state.sold_supply,
        new_sold_supply
    );

    Ok(PurchaseResult::new(
        request.buyer,
        request.amount,
        unit_price,
        cost,
        state.sold_supply,
        new_sold_supply,
    ))
}

/// Owner of a single issuance's supply state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuanceLedger {
    state: SupplyState,
}

impl IssuanceLedger {
    /// Start a new issuance with nothing sold.
    pub fn new(total_supply: Amount) -> Result<Self, IssuanceError> {
        Self::with_state(SupplyState::new(total_supply))
    }

    /// Resume an issuance from a persisted state.
    pub fn with_state(state: SupplyState) -> Result<Self, IssuanceError> {
        if state.total_supply > MAX_TOTAL_SUPPLY {
            return Err(IssuanceError::SupplyOutOfRange {
                total: state.total_supply,
                max: MAX_TOTAL_SUPPLY,
            });
        }
        if !state.is_consistent() {
            return Err(IssuanceError::InvariantViolation {
                total: state.total_supply,
                sold: state.sold_supply,
            });
        }
        Ok(Self { state })
    }

    pub fn state(&self) -> SupplyState {
        self.state
    }

    pub fn total_supply(&self) -> Amount {
        self.state.total_supply
    }

    pub fn sold_supply(&self) -> Amount {
        self.state.sold_supply
    }

    pub fn remaining(&self) -> Amount {
        self.state.remaining()
    }

    /// Unit price at the current state.
    pub fn current_price(&self) -> Result<Amount, IssuanceError> {
        price_of(&self.state)
    }

    /// Price a request against the current state without applying it.
    pub fn quote(&self, request: &PurchaseRequest) -> Result<PurchaseResult, IssuanceError> {
        buy(request, &self.state)
    }

    /// Apply a result produced by [`buy`] or [`IssuanceLedger::quote`].
    ///
    /// A result priced against a different sold count is rejected with
    /// [`IssuanceError::StaleResult`], so the same purchase cannot be
    /// committed twice.
    pub fn commit(&mut self, result: &PurchaseResult) -> Result<(), IssuanceError> {
        if result.prior_sold_supply() != self.state.sold_supply {
            return Err(IssuanceError::StaleResult {
                priced_at: result.prior_sold_supply(),
                current: self.state.sold_supply,
            });
        }

        let remaining = self.state.remaining();
        if result.amount() > remaining {
            return Err(IssuanceError::InsufficientTreasury {
                requested: result.amount(),
                remaining,
            });
        }

        self.state.sold_supply = result.new_sold_supply();

        info!(
            target: "issuance",
            "Committed sale of {} units to {:?}: sold {}/{}",
            result.amount(),
            result.buyer(),
            self.state.sold_supply,
            self.state.total_supply
        );

        Ok(())
    }

    /// Quote and commit in one step.
    pub fn execute(&mut self, request: &PurchaseRequest) -> Result<PurchaseResult, IssuanceError> {
        let result = self.quote(request)?;
        self.commit(&result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meretrix_types::AccountId;

    fn request(amount: Amount) -> PurchaseRequest {
        PurchaseRequest::new(AccountId::from_handle("@buyer"), amount)
    }

    #[test]
    fn test_cost_at_fresh_state() {
        let state = SupplyState::new(1_000);
        let result = buy(&request(10), &state).unwrap();
        assert_eq!(result.unit_price(), 2_000);
        assert_eq!(result.cost(), 20_000);
        assert_eq!(result.new_sold_supply(), 10);
        assert_eq!(result.prior_sold_supply(), 0);
    }

    #[test]
    fn test_zero_amount_rejected_first() {
        // Even an inconsistent state reports the zero amount.
        let state = SupplyState::from_parts(10, 20);
        assert_eq!(buy(&request(0), &state), Err(IssuanceError::InvalidAmount));
    }

    #[test]
    fn test_exact_remaining_accepted() {
        let state = SupplyState::from_parts(100, 90);
        let result = buy(&request(10), &state).unwrap();
        assert_eq!(result.new_sold_supply(), 100);
        assert_eq!(result.cost(), 200);
    }

    #[test]
    fn test_oversell_rejected() {
        let state = SupplyState::from_parts(100, 90);
        assert_eq!(
            buy(&request(11), &state),
            Err(IssuanceError::InsufficientTreasury {
                requested: 11,
                remaining: 10
            })
        );
    }

    #[test]
    fn test_cost_overflow_detected() {
        let state = SupplyState::new(MAX_TOTAL_SUPPLY);
        assert_eq!(
            buy(&request(2), &state),
            Err(IssuanceError::ArithmeticOverflow("purchase cost"))
        );
    }

    #[test]
    fn test_overflow_reported_before_treasury() {
        // unit price is 2 and only one unit is left; both checks would fail
        let state = SupplyState::from_parts(MAX_TOTAL_SUPPLY, MAX_TOTAL_SUPPLY - 1);
        assert_eq!(
            buy(&request(Amount::MAX), &state),
            Err(IssuanceError::ArithmeticOverflow("purchase cost"))
        );
    }

    #[test]
    fn test_ledger_execute_advances_state() {
        let mut ledger = IssuanceLedger::new(1_000).unwrap();
        ledger.execute(&request(400)).unwrap();
        assert_eq!(ledger.sold_supply(), 400);
        assert_eq!(ledger.current_price().unwrap(), 1_200);
    }

    #[test]
    fn test_commit_twice_is_rejected() {
        let mut ledger = IssuanceLedger::new(1_000).unwrap();
        let result = ledger.quote(&request(5)).unwrap();
        ledger.commit(&result).unwrap();

        let err = ledger.commit(&result).unwrap_err();
        assert_eq!(err, IssuanceError::StaleResult { priced_at: 0, current: 5 });
        assert_eq!(ledger.sold_supply(), 5);
    }

    #[test]
    fn test_commit_from_larger_issuance_rejected() {
        let big = SupplyState::new(1_000);
        let result = buy(&request(500), &big).unwrap();

        let mut small = IssuanceLedger::new(100).unwrap();
        let err = small.commit(&result).unwrap_err();
        assert!(matches!(err, IssuanceError::InsufficientTreasury { .. }));
        assert_eq!(small.sold_supply(), 0);
    }

    #[test]
    fn test_with_state_validates() {
        assert!(IssuanceLedger::with_state(SupplyState::from_parts(10, 11)).is_err());
        assert!(IssuanceLedger::new(MAX_TOTAL_SUPPLY + 1).is_err());
        assert!(IssuanceLedger::with_state(SupplyState::from_parts(10, 10)).is_ok());
    }
}
