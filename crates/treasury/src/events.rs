//! Events recorded by the token sale

use meretrix_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SaleEvent {
    Bought {
        payer: AccountId,
        recipient: AccountId,
        amount: Amount,
        unit_price: Amount,
        cost: Amount,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    Paused {
        by: AccountId,
    },
    Unpaused {
        by: AccountId,
    },
    Withdrawn {
        to: AccountId,
        amount: Amount,
    },
}
