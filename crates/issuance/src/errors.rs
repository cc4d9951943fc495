use meretrix_types::Amount;
use thiserror::Error;

/// Reasons a price query or purchase is rejected.
///
/// Every variant is returned before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    #[error("supply invariant violated: sold={sold} exceeds total={total}")]
    InvariantViolation { total: Amount, sold: Amount },

    #[error("total supply {total} exceeds supported maximum {max}")]
    SupplyOutOfRange { total: Amount, max: Amount },

    #[error("purchase amount must be greater than zero")]
    InvalidAmount,

    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    #[error("insufficient treasury: requested={requested}, remaining={remaining}")]
    InsufficientTreasury { requested: Amount, remaining: Amount },

    #[error("stale purchase result: priced at sold={priced_at}, current sold={current}")]
    StaleResult { priced_at: Amount, current: Amount },
}
