use crate::account_ledger::LedgerError;
use meretrix_issuance::IssuanceError;
use meretrix_types::{AccountId, Amount};
use thiserror::Error;

/// Errors returned by the token sale. No variant leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("sale is paused")]
    Paused,

    #[error("sale is already paused")]
    AlreadyPaused,

    #[error("sale is not paused")]
    NotPaused,

    #[error("{caller} does not hold the {role} role")]
    Unauthorized { caller: AccountId, role: &'static str },

    #[error("order deadline {deadline} has passed (now {now})")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("amount {requested} exceeds per-transaction limit {limit}")]
    MaxPerTxExceeded { requested: Amount, limit: Amount },

    #[error("quoted price {quoted} does not match current price {current}")]
    PriceMismatch { quoted: Amount, current: Amount },

    #[error("payment {paid} is below cost {cost}")]
    InsufficientPayment { cost: Amount, paid: Amount },

    #[error("insufficient proceeds: available={available}, requested={requested}")]
    InsufficientProceeds { available: Amount, requested: Amount },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("invalid sale config: {0}")]
    Config(String),
}

/// Errors loading or validating a [`crate::SaleConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid sale config: {0}")]
    Invalid(String),
}
