//! Token balance ledger
//!
//! Provides a lightweight, deterministic interface for crediting, debiting,
//! and transferring token balances. The sale credits purchased units here;
//! the ledger itself knows nothing about pricing.

use meretrix_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance for {account}: available={available}, requested={requested}")]
    InsufficientBalance {
        account: AccountId,
        available: Amount,
        requested: Amount,
    },
    #[error("balance overflow crediting {account}")]
    BalanceOverflow { account: AccountId },
}

/// Interface for balance ledger operations.
pub trait BalanceLedger: Send + Sync {
    /// Credit an account with newly issued units.
    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Debit an account, removing units from circulation.
    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Retrieve an account's balance.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Total units credited and not debited across all accounts.
    fn total_issued(&self) -> Amount;

    /// Retrieve all balances (snapshot).
    fn all_balances(&self) -> HashMap<AccountId, Amount>;

    /// Move units between accounts. Fails without side effects.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        if self.balance_of(to).checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow { account: *to });
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }
}

// -----------------------------------------------------------------------------
// In-memory implementation
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryBalanceLedger {
    balances: HashMap<AccountId, Amount>,
    total_issued: Amount,
}

impl InMemoryBalanceLedger {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            total_issued: 0,
        }
    }
}

fn apply_credit(
    balances: &mut HashMap<AccountId, Amount>,
    total: &mut Amount,
    account: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let current = balances.get(account).copied().unwrap_or(0);
    let new_balance = current
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow { account: *account })?;
    let new_total = total
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow { account: *account })?;
    balances.insert(*account, new_balance);
    *total = new_total;
    Ok(())
}

fn apply_debit(
    balances: &mut HashMap<AccountId, Amount>,
    total: &mut Amount,
    account: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let current = balances.get(account).copied().unwrap_or(0);
    if current < amount {
        return Err(LedgerError::InsufficientBalance {
            account: *account,
            available: current,
            requested: amount,
        });
    }
    balances.insert(*account, current - amount);
    *total = total.saturating_sub(amount);
    Ok(())
}

impl BalanceLedger for InMemoryBalanceLedger {
    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        apply_credit(&mut self.balances, &mut self.total_issued, account, amount)
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        apply_debit(&mut self.balances, &mut self.total_issued, account, amount)
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_issued(&self) -> Amount {
        self.total_issued
    }

    fn all_balances(&self) -> HashMap<AccountId, Amount> {
        self.balances.clone()
    }
}

// -----------------------------------------------------------------------------
// Mock ledger (records every call)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct MockBalanceLedger {
    balances: HashMap<AccountId, Amount>,
    total_issued: Amount,
    credit_calls: Vec<(AccountId, Amount)>,
    debit_calls: Vec<(AccountId, Amount)>,
}

impl MockBalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit_calls(&self) -> &[(AccountId, Amount)] {
        &self.credit_calls
    }

    pub fn debit_calls(&self) -> &[(AccountId, Amount)] {
        &self.debit_calls
    }

    pub fn clear_calls(&mut self) {
        self.credit_calls.clear();
        self.debit_calls.clear();
    }
}

impl BalanceLedger for MockBalanceLedger {
    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.credit_calls.push((*account, amount));
        apply_credit(&mut self.balances, &mut self.total_issued, account, amount)
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.debit_calls.push((*account, amount));
        apply_debit(&mut self.balances, &mut self.total_issued, account, amount)
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_issued(&self) -> Amount {
        self.total_issued
    }

    fn all_balances(&self) -> HashMap<AccountId, Amount> {
        self.balances.clone()
    }
}
