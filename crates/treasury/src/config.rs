//! Sale configuration
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! ```toml
//! name = "Meretrix"
//! symbol = "MRTX"
//! total_supply = 1000000
//! max_per_tx = 50000
//! ```
//!
//! Amounts above the TOML integer range may be written as decimal strings,
//! e.g. `total_supply = "170_141_183_460_469_231_731_687_303_715_884_105_727"`.
//!
//! `MERETRIX_TOTAL_SUPPLY` and `MERETRIX_MAX_PER_TX` take precedence over the
//! file.

use crate::errors::ConfigError;
use meretrix_types::{Amount, MAX_TOTAL_SUPPLY};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_NAME: &str = "Meretrix";
const DEFAULT_SYMBOL: &str = "MRTX";
const DEFAULT_TOTAL_SUPPLY: Amount = 1_000_000;
const DEFAULT_MAX_PER_TX: Amount = 50_000;

pub const ENV_TOTAL_SUPPLY: &str = "MERETRIX_TOTAL_SUPPLY";
pub const ENV_MAX_PER_TX: &str = "MERETRIX_MAX_PER_TX";

/// Parameters fixed when a sale is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleConfig {
    pub name: String,
    pub symbol: String,
    /// Units available for sale over the lifetime of the issuance
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_supply: Amount,
    /// Largest amount a single purchase may request
    #[serde(deserialize_with = "deserialize_amount")]
    pub max_per_tx: Amount,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            total_supply: DEFAULT_TOTAL_SUPPLY,
            max_per_tx: DEFAULT_MAX_PER_TX,
        }
    }
}

impl SaleConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(target: "sale", "Loaded sale config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// File (or defaults), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        info!(
            target: "sale",
            "Sale config: {} ({}), total_supply={}, max_per_tx={}",
            config.name,
            config.symbol,
            config.total_supply,
            config.max_per_tx
        );
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TOTAL_SUPPLY) {
            self.total_supply = parse_amount(ENV_TOTAL_SUPPLY, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_PER_TX) {
            self.max_per_tx = parse_amount(ENV_MAX_PER_TX, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.total_supply == 0 || self.total_supply > MAX_TOTAL_SUPPLY {
            return Err(ConfigError::Invalid(format!(
                "total_supply must be in 1..={}, got {}",
                MAX_TOTAL_SUPPLY, self.total_supply
            )));
        }
        if self.max_per_tx == 0 {
            return Err(ConfigError::Invalid("max_per_tx must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_amount(var: &'static str, value: &str) -> Result<Amount, ConfigError> {
    value
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        })
}

/// TOML integers stop at `i64::MAX`, so amounts also accept decimal strings.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
            Ok(Amount::from(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
            u64::try_from(value)
                .map(Amount::from)
                .map_err(|_| E::custom(format!("amount must not be negative, got {value}")))
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<Amount, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
            value
                .trim()
                .replace('_', "")
                .parse()
                .map_err(|_| E::custom(format!("invalid amount {value:?}")))
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}
