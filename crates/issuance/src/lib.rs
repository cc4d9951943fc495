//! Meretrix Issuance Engine
//!
//! Prices token units on a linear curve over the unsold float and turns a
//! purchase request into a validated supply transition:
//! - `price` derives the unit price from `(total_supply, sold_supply)`
//! - `buy` validates a request and returns the new sold count and the cost
//! - `IssuanceLedger` owns a `SupplyState` and commits results exactly once
//!
//! Crediting tokens, settling payment and refunds belong to the caller.

pub mod errors;
pub mod ledger;
pub mod price;
pub mod types;

pub use errors::*;
pub use ledger::*;
pub use price::*;
pub use types::*;

pub use meretrix_types::{AccountId, Amount, SupplyState, MAX_TOTAL_SUPPLY, PRICE_SLOPE};
