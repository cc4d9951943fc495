//! Linear price curve over the unsold float
//!
//! `unit_price = (total_supply - sold_supply) * PRICE_SLOPE`
//!
//! The price falls as the float sells and reaches zero once everything is
//! sold. This is the opposite of a scarcity curve and is kept exactly as
//! deployed.

use crate::errors::IssuanceError;
use meretrix_types::{Amount, SupplyState, MAX_TOTAL_SUPPLY, PRICE_SLOPE};
use tracing::warn;

/// Unit price for the given supply figures.
///
/// Fails with [`IssuanceError::InvariantViolation`] when `sold_supply` exceeds
/// `total_supply`; the state is never normalized.
pub fn price(total_supply: Amount, sold_supply: Amount) -> Result<Amount, IssuanceError> {
    if sold_supply > total_supply {
        warn!(
            target: "issuance",
            "Refusing to price inconsistent supply: sold={} total={}",
            sold_supply,
            total_supply
        );
        return Err(IssuanceError::InvariantViolation {
            total: total_supply,
            sold: sold_supply,
        });
    }

    if total_supply > MAX_TOTAL_SUPPLY {
        return Err(IssuanceError::SupplyOutOfRange {
            total: total_supply,
            max: MAX_TOTAL_SUPPLY,
        });
    }

    // total_supply <= MAX_TOTAL_SUPPLY, so this fits.
    Ok((total_supply - sold_supply) * PRICE_SLOPE)
}

/// Unit price for a supply snapshot.
pub fn price_of(state: &SupplyState) -> Result<Amount, IssuanceError> {
    price(state.total_supply, state.sold_supply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_points() {
        assert_eq!(price(1_000, 0).unwrap(), 2_000);
        assert_eq!(price(1_000, 500).unwrap(), 1_000);
        assert_eq!(price(1_000, 1_000).unwrap(), 0);
    }

    #[test]
    fn test_empty_supply_is_free() {
        assert_eq!(price(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_oversold_state_rejected() {
        let err = price(1_000, 1_001).unwrap_err();
        assert_eq!(
            err,
            IssuanceError::InvariantViolation {
                total: 1_000,
                sold: 1_001
            }
        );
    }

    #[test]
    fn test_largest_supported_supply() {
        assert_eq!(price(MAX_TOTAL_SUPPLY, 0).unwrap(), MAX_TOTAL_SUPPLY * 2);
        assert_eq!(price(MAX_TOTAL_SUPPLY, MAX_TOTAL_SUPPLY).unwrap(), 0);
    }

    #[test]
    fn test_supply_beyond_maximum_rejected() {
        let err = price(MAX_TOTAL_SUPPLY + 1, 0).unwrap_err();
        assert!(matches!(err, IssuanceError::SupplyOutOfRange { .. }));
    }

    #[test]
    fn test_price_of_matches_price() {
        let state = SupplyState::from_parts(250, 50);
        assert_eq!(price_of(&state).unwrap(), price(250, 50).unwrap());
    }
}
