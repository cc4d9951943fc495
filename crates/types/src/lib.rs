//! Meretrix shared types
//!
//! Monetary amounts, account identities and the supply state shared by the
//! issuance engine and the token sale.

pub mod account;
pub mod supply;

pub use account::*;
pub use supply::*;

/// Token amount in whole units.
///
/// Also used for prices and costs; all arithmetic on it is integer only.
pub type Amount = u128;

/// Slope of the linear price curve: each unsold unit adds this much to the unit price.
pub const PRICE_SLOPE: Amount = 2;

/// Largest total supply for which `(total - sold) * PRICE_SLOPE` fits in an [`Amount`].
pub const MAX_TOTAL_SUPPLY: Amount = Amount::MAX / PRICE_SLOPE;
