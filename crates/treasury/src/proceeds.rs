//! Sale proceeds
//!
//! Tracks payment collected from purchases and withdrawals made by the
//! treasurer. The balance never goes negative and every withdrawal is kept
//! for audit.

use crate::errors::SaleError;
use meretrix_issuance::IssuanceError;
use meretrix_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A single payout from the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub to: AccountId,
    pub amount: Amount,
}

/// Proceeds statistics for monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceedsStats {
    pub total_collected: Amount,
    pub total_withdrawn: Amount,
    pub balance: Amount,
    pub deposits: u64,
    pub withdrawals: u64,
    pub largest_deposit: Amount,
}

/// Vault holding collected purchase payments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProceedsVault {
    balance: Amount,
    total_collected: Amount,
    total_withdrawn: Amount,
    deposits: u64,
    largest_deposit: Amount,
    withdrawals: Vec<Withdrawal>,
}

impl ProceedsVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that a deposit of `amount` would not overflow the counters.
    pub fn can_accept(&self, amount: Amount) -> Result<(), SaleError> {
        self.balance
            .checked_add(amount)
            .and(self.total_collected.checked_add(amount))
            .map(|_| ())
            .ok_or(SaleError::Issuance(IssuanceError::ArithmeticOverflow(
                "proceeds balance",
            )))
    }

    /// Record payment for a purchase.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), SaleError> {
        self.can_accept(amount)?;
        if amount == 0 {
            debug!(target: "sale", "Zero-cost purchase, nothing to collect");
            return Ok(());
        }

        self.balance += amount;
        self.total_collected += amount;
        self.deposits += 1;
        self.largest_deposit = self.largest_deposit.max(amount);

        debug!(target: "sale", "Collected {} in proceeds (balance {})", amount, self.balance);
        Ok(())
    }

    /// Pay out `amount` to `to`.
    pub fn withdraw(&mut self, to: AccountId, amount: Amount) -> Result<Withdrawal, SaleError> {
        if amount == 0 {
            return Err(SaleError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(SaleError::InsufficientProceeds {
                available: self.balance,
                requested: amount,
            });
        }

        self.balance -= amount;
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
        let withdrawal = Withdrawal { to, amount };
        self.withdrawals.push(withdrawal);

        info!(
            target: "sale",
            "Withdrew {} proceeds to {:?} (remaining {})",
            amount,
            to,
            self.balance
        );

        Ok(withdrawal)
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn total_collected(&self) -> Amount {
        self.total_collected
    }

    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    pub fn withdrawals(&self) -> &[Withdrawal] {
        &self.withdrawals
    }

    pub fn statistics(&self) -> ProceedsStats {
        ProceedsStats {
            total_collected: self.total_collected,
            total_withdrawn: self.total_withdrawn,
            balance: self.balance,
            deposits: self.deposits,
            withdrawals: self.withdrawals.len() as u64,
            largest_deposit: self.largest_deposit,
        }
    }
}
