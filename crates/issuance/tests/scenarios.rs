//! Concrete purchase scenarios for the issuance engine.

use meretrix_issuance::*;

fn alice() -> AccountId {
    AccountId::from_handle("@alice")
}

fn req(amount: Amount) -> PurchaseRequest {
    PurchaseRequest::new(alice(), amount)
}

#[test]
fn test_price_falls_as_float_sells() {
    assert_eq!(price(1000, 0).unwrap(), 2000);
    assert_eq!(price(1000, 500).unwrap(), 1000);
    assert_eq!(price(1000, 1000).unwrap(), 0);
}

#[test]
fn test_cost_correctness() {
    let result = buy(&req(10), &SupplyState::new(1000)).unwrap();
    assert_eq!(result.unit_price(), 2000);
    assert_eq!(result.cost(), 20000);
    assert_eq!(result.new_sold_supply(), 10);
}

#[test]
fn test_no_oversell() {
    let state = SupplyState::from_parts(100, 90);

    let err = buy(&req(11), &state).unwrap_err();
    assert!(matches!(err, IssuanceError::InsufficientTreasury { requested: 11, remaining: 10 }));

    let ok = buy(&req(10), &state).unwrap();
    assert_eq!(ok.new_sold_supply(), 100);
}

#[test]
fn test_zero_amount_rejected_in_every_state() {
    for state in [
        SupplyState::new(0),
        SupplyState::new(1000),
        SupplyState::from_parts(1000, 1000),
        SupplyState::from_parts(5, 6),
    ] {
        assert_eq!(buy(&req(0), &state), Err(IssuanceError::InvalidAmount));
    }
}

#[test]
fn test_overflow_guard() {
    let state = SupplyState::new(MAX_TOTAL_SUPPLY);
    let unit_price = price_of(&state).unwrap();
    assert!(unit_price.checked_mul(3).is_none());

    let err = buy(&req(3), &state).unwrap_err();
    assert!(matches!(err, IssuanceError::ArithmeticOverflow(_)));
}

#[test]
fn test_failed_purchases_leave_ledger_untouched() {
    // InvalidAmount, InsufficientTreasury
    let mut ledger = IssuanceLedger::new(100).unwrap();
    ledger.execute(&req(90)).unwrap();
    let before = ledger.state();

    assert!(ledger.execute(&req(0)).is_err());
    assert_eq!(ledger.state(), before);

    assert!(ledger.execute(&req(11)).is_err());
    assert_eq!(ledger.state(), before);

    // ArithmeticOverflow
    let mut huge = IssuanceLedger::new(MAX_TOTAL_SUPPLY).unwrap();
    let before = huge.state();
    assert!(matches!(
        huge.execute(&req(1_000)),
        Err(IssuanceError::ArithmeticOverflow(_))
    ));
    assert_eq!(huge.state(), before);

    // InvariantViolation against a corrupted external state
    let corrupted = SupplyState::from_parts(50, 60);
    let copy = corrupted;
    assert!(matches!(
        buy(&req(1), &corrupted),
        Err(IssuanceError::InvariantViolation { total: 50, sold: 60 })
    ));
    assert_eq!(corrupted, copy);
}

#[test]
fn test_selling_out_drives_price_to_zero() {
    let mut ledger = IssuanceLedger::new(10).unwrap();
    let mut total_cost = 0;
    for _ in 0..10 {
        total_cost += ledger.execute(&req(1)).unwrap().cost();
    }
    // 20 + 18 + ... + 2
    assert_eq!(total_cost, 110);
    assert_eq!(ledger.current_price().unwrap(), 0);
    assert_eq!(ledger.remaining(), 0);
    assert!(matches!(
        ledger.execute(&req(1)),
        Err(IssuanceError::InsufficientTreasury { remaining: 0, .. })
    ));
}

#[test]
fn test_repeated_quote_is_identical() {
    let ledger = IssuanceLedger::new(1000).unwrap();
    let first = ledger.quote(&req(7)).unwrap();
    let second = ledger.quote(&req(7)).unwrap();
    assert_eq!(first, second);
    assert_eq!(ledger.sold_supply(), 0);
}

#[test]
fn test_result_serializes_for_callers() {
    let result = buy(&req(10), &SupplyState::new(1000)).unwrap();
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["cost"], 20000);
    assert_eq!(json["new_sold_supply"], 10);
}
