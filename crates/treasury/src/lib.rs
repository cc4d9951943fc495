//! Meretrix Treasury Module
//!
//! Runs a token sale on top of the issuance engine: balance ledger,
//! proceeds collection, pause and withdraw controls, and sale configuration.

pub mod account_ledger;
pub mod config;
pub mod errors;
pub mod events;
pub mod proceeds;
pub mod sale;

pub use account_ledger::{BalanceLedger, InMemoryBalanceLedger, LedgerError, MockBalanceLedger};
pub use config::SaleConfig;
pub use errors::{ConfigError, SaleError};
pub use events::SaleEvent;
pub use proceeds::{ProceedsStats, ProceedsVault, Withdrawal};
pub use sale::{PurchaseOrder, SaleReceipt, SaleRoles, TokenSale};
