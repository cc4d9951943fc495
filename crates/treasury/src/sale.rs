//! Token sale
//!
//! Drives the issuance engine for a single token: prices and validates
//! purchases, commits the supply transition, credits the buyer, collects
//! payment and computes refunds. Pause and withdraw are gated by roles.
//!
//! All mutable state sits behind one `RwLock`. Price queries share the read
//! lock; purchases and admin actions take the write lock, so commits are
//! applied in a single total order and never interleave.

use crate::account_ledger::{BalanceLedger, InMemoryBalanceLedger, LedgerError};
use crate::config::SaleConfig;
use crate::errors::SaleError;
use crate::events::SaleEvent;
use crate::proceeds::{ProceedsStats, ProceedsVault};
use meretrix_issuance::{IssuanceLedger, PurchaseRequest};
use meretrix_types::{AccountId, Amount, SupplyState};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Holders of the privileged sale roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRoles {
    /// May pause and unpause the sale
    pub pauser: AccountId,
    /// May withdraw collected proceeds
    pub treasurer: AccountId,
}

impl SaleRoles {
    /// One account holding every role.
    pub fn single(admin: AccountId) -> Self {
        Self {
            pauser: admin,
            treasurer: admin,
        }
    }
}

/// A buyer's purchase terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Units requested
    pub amount: Amount,
    /// Unit price the buyer agreed to; must equal the current price
    pub quoted_price: Amount,
    /// Last timestamp (unix seconds) at which the order may execute
    pub deadline: u64,
    /// Payment attached to the order; anything above cost is refunded
    pub payment: Amount,
}

impl PurchaseOrder {
    /// Order paying exactly `amount * quoted_price`.
    pub fn exact(amount: Amount, quoted_price: Amount, deadline: u64) -> Self {
        Self {
            amount,
            quoted_price,
            deadline,
            payment: amount.saturating_mul(quoted_price),
        }
    }

    pub fn with_payment(mut self, payment: Amount) -> Self {
        self.payment = payment;
        self
    }
}

/// Settlement of an executed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub unit_price: Amount,
    pub cost: Amount,
    /// Overpayment owed back to the payer
    pub refund: Amount,
    pub sold_supply: Amount,
}

#[derive(Debug)]
struct SaleInner<L> {
    issuance: IssuanceLedger,
    balances: L,
    proceeds: ProceedsVault,
    paused: bool,
    events: Vec<SaleEvent>,
}

/// A running token sale.
#[derive(Debug)]
pub struct TokenSale<L: BalanceLedger = InMemoryBalanceLedger> {
    config: SaleConfig,
    roles: SaleRoles,
    inner: RwLock<SaleInner<L>>,
}

impl TokenSale<InMemoryBalanceLedger> {
    /// Sale backed by an in-memory balance ledger.
    pub fn in_memory(config: SaleConfig, roles: SaleRoles) -> Result<Self, SaleError> {
        Self::new(config, roles, InMemoryBalanceLedger::new())
    }
}

impl<L: BalanceLedger> TokenSale<L> {
    /// Create a sale with the full supply in the treasury.
    pub fn new(config: SaleConfig, roles: SaleRoles, balances: L) -> Result<Self, SaleError> {
        config.validate().map_err(|err| SaleError::Config(err.to_string()))?;
        let issuance = IssuanceLedger::new(config.total_supply)?;

        info!(
            target: "sale",
            "Opened sale of {} {} ({}), max {} per purchase",
            config.total_supply,
            config.symbol,
            config.name,
            config.max_per_tx
        );

        Ok(Self {
            config,
            roles,
            inner: RwLock::new(SaleInner {
                issuance,
                balances,
                proceeds: ProceedsVault::new(),
                paused: false,
                events: Vec::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn max_per_tx(&self) -> Amount {
        self.config.max_per_tx
    }

    /// Unit price at the current supply state.
    pub fn current_price(&self) -> Result<Amount, SaleError> {
        Ok(self.inner.read().issuance.current_price()?)
    }

    /// Units still available for sale.
    pub fn remaining(&self) -> Amount {
        self.inner.read().issuance.remaining()
    }

    pub fn supply_state(&self) -> SupplyState {
        self.inner.read().issuance.state()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.read().paused
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.inner.read().balances.balance_of(account)
    }

    /// Units credited to holders so far.
    pub fn total_issued(&self) -> Amount {
        self.inner.read().balances.total_issued()
    }

    pub fn proceeds(&self) -> ProceedsStats {
        self.inner.read().proceeds.statistics()
    }

    /// Run `f` against the balance ledger.
    pub fn with_balances<R>(&self, f: impl FnOnce(&L) -> R) -> R {
        f(&self.inner.read().balances)
    }

    /// Drain the events recorded since the last call.
    ///
    /// Events accumulate until drained; long-running callers must call this
    /// periodically.
    pub fn take_events(&self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.inner.write().events)
    }

    /// Buy for the payer's own account.
    pub fn buy(
        &self,
        payer: AccountId,
        order: PurchaseOrder,
        now: u64,
    ) -> Result<SaleReceipt, SaleError> {
        self.buy_to(payer, payer, order, now)
    }

    /// Buy on behalf of `recipient`, paid by `payer`.
    ///
    /// Every check runs before anything is written.
    pub fn buy_to(
        &self,
        payer: AccountId,
        recipient: AccountId,
        order: PurchaseOrder,
        now: u64,
    ) -> Result<SaleReceipt, SaleError> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if inner.paused {
            return Err(SaleError::Paused);
        }
        if now > order.deadline {
            return Err(SaleError::DeadlineExpired {
                deadline: order.deadline,
                now,
            });
        }

        let result = inner
            .issuance
            .quote(&PurchaseRequest::new(recipient, order.amount))?;

        if order.amount > self.config.max_per_tx {
            return Err(SaleError::MaxPerTxExceeded {
                requested: order.amount,
                limit: self.config.max_per_tx,
            });
        }
        if order.quoted_price != result.unit_price() {
            debug!(
                target: "sale",
                "Price moved for {:?}: quoted {}, current {}",
                payer,
                order.quoted_price,
                result.unit_price()
            );
            return Err(SaleError::PriceMismatch {
                quoted: order.quoted_price,
                current: result.unit_price(),
            });
        }
        if order.payment < result.cost() {
            return Err(SaleError::InsufficientPayment {
                cost: result.cost(),
                paid: order.payment,
            });
        }
        inner.proceeds.can_accept(result.cost())?;
        if inner
            .balances
            .balance_of(&recipient)
            .checked_add(order.amount)
            .is_none()
        {
            return Err(LedgerError::BalanceOverflow { account: recipient }.into());
        }

        inner.issuance.commit(&result)?;
        inner.balances.credit(&recipient, order.amount)?;
        inner.proceeds.deposit(result.cost())?;

        let receipt = SaleReceipt {
            payer,
            recipient,
            amount: order.amount,
            unit_price: result.unit_price(),
            cost: result.cost(),
            refund: order.payment - result.cost(),
            sold_supply: result.new_sold_supply(),
        };

        inner.events.push(SaleEvent::Bought {
            payer,
            recipient,
            amount: receipt.amount,
            unit_price: receipt.unit_price,
            cost: receipt.cost,
        });

        info!(
            target: "sale",
            "{:?} bought {} {} for {:?} at {} (cost {}, refund {})",
            payer,
            receipt.amount,
            self.config.symbol,
            recipient,
            receipt.unit_price,
            receipt.cost,
            receipt.refund
        );

        Ok(receipt)
    }

    /// Move tokens between holders. Blocked while paused.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), SaleError> {
        let mut inner = self.inner.write();
        if inner.paused {
            return Err(SaleError::Paused);
        }
        inner.balances.transfer(&from, &to, amount)?;
        inner.events.push(SaleEvent::Transfer { from, to, amount });
        debug!(target: "sale", "Transferred {} from {:?} to {:?}", amount, from, to);
        Ok(())
    }

    pub fn pause(&self, caller: AccountId) -> Result<(), SaleError> {
        require_role(caller, self.roles.pauser, "pauser")?;
        let mut inner = self.inner.write();
        if inner.paused {
            return Err(SaleError::AlreadyPaused);
        }
        inner.paused = true;
        inner.events.push(SaleEvent::Paused { by: caller });
        info!(target: "sale", "Sale paused by {:?}", caller);
        Ok(())
    }

    pub fn unpause(&self, caller: AccountId) -> Result<(), SaleError> {
        require_role(caller, self.roles.pauser, "pauser")?;
        let mut inner = self.inner.write();
        if !inner.paused {
            return Err(SaleError::NotPaused);
        }
        inner.paused = false;
        inner.events.push(SaleEvent::Unpaused { by: caller });
        info!(target: "sale", "Sale resumed by {:?}", caller);
        Ok(())
    }

    /// Pay collected proceeds out to `to`.
    pub fn withdraw(
        &self,
        caller: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), SaleError> {
        require_role(caller, self.roles.treasurer, "treasurer")?;
        let mut inner = self.inner.write();
        inner.proceeds.withdraw(to, amount)?;
        inner.events.push(SaleEvent::Withdrawn { to, amount });
        Ok(())
    }
}

fn require_role(caller: AccountId, holder: AccountId, role: &'static str) -> Result<(), SaleError> {
    if caller == holder {
        Ok(())
    } else {
        debug!(target: "sale", "{:?} denied {} action", caller, role);
        Err(SaleError::Unauthorized { caller, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_ledger::MockBalanceLedger;
    use meretrix_issuance::IssuanceError;

    const NOW: u64 = 1_700_000_000;

    fn admin() -> AccountId {
        AccountId::from_handle("@admin")
    }

    fn small_sale() -> TokenSale {
        let config = SaleConfig {
            total_supply: 100,
            max_per_tx: 50,
            ..SaleConfig::default()
        };
        TokenSale::in_memory(config, SaleRoles::single(admin())).unwrap()
    }

    #[test]
    fn test_receipt_reports_refund() {
        let sale = small_sale();
        let buyer = AccountId::from_handle("@buyer");
        let order = PurchaseOrder::exact(10, 200, NOW).with_payment(2_500);

        let receipt = sale.buy(buyer, order, NOW).unwrap();
        assert_eq!(receipt.cost, 2_000);
        assert_eq!(receipt.refund, 500);
        assert_eq!(receipt.sold_supply, 10);
        assert_eq!(sale.proceeds().balance, 2_000);
    }

    #[test]
    fn test_buy_credits_through_ledger() {
        let config = SaleConfig {
            total_supply: 100,
            ..SaleConfig::default()
        };
        let sale = TokenSale::new(config, SaleRoles::single(admin()), MockBalanceLedger::new())
            .unwrap();
        let buyer = AccountId::from_handle("@buyer");

        sale.buy(buyer, PurchaseOrder::exact(3, 200, NOW), NOW).unwrap();

        sale.with_balances(|ledger| {
            assert_eq!(ledger.credit_calls(), &[(buyer, 3)]);
            assert!(ledger.debit_calls().is_empty());
        });
    }

    #[test]
    fn test_rejections_leave_sale_untouched() {
        let sale = small_sale();
        let buyer = AccountId::from_handle("@buyer");
        let before = sale.supply_state();

        let attempts = [
            PurchaseOrder::exact(0, 200, NOW),
            PurchaseOrder::exact(51, 200, NOW),
            PurchaseOrder::exact(10, 199, NOW),
            PurchaseOrder::exact(10, 200, NOW).with_payment(1_999),
            PurchaseOrder::exact(10, 200, NOW - 1),
        ];
        for order in attempts {
            assert!(sale.buy(buyer, order, NOW).is_err());
        }

        assert_eq!(sale.supply_state(), before);
        assert_eq!(sale.balance_of(&buyer), 0);
        assert_eq!(sale.proceeds().balance, 0);
        assert!(sale.take_events().is_empty());
    }

    #[test]
    fn test_issuance_errors_surface_unchanged() {
        let sale = small_sale();
        let err = sale
            .buy(admin(), PurchaseOrder::exact(0, 200, NOW), NOW)
            .unwrap_err();
        assert_eq!(err, SaleError::Issuance(IssuanceError::InvalidAmount));
    }

    #[test]
    fn test_invalid_config_refused() {
        let invalid = [
            SaleConfig {
                name: String::new(),
                ..SaleConfig::default()
            },
            SaleConfig {
                symbol: " ".into(),
                ..SaleConfig::default()
            },
            SaleConfig {
                total_supply: 0,
                ..SaleConfig::default()
            },
            SaleConfig {
                max_per_tx: 0,
                ..SaleConfig::default()
            },
        ];
        for config in invalid {
            assert!(matches!(
                TokenSale::in_memory(config, SaleRoles::single(admin())),
                Err(SaleError::Config(_))
            ));
        }
    }

    #[test]
    fn test_double_pause_rejected() {
        let sale = small_sale();
        sale.pause(admin()).unwrap();
        assert_eq!(sale.pause(admin()), Err(SaleError::AlreadyPaused));
        sale.unpause(admin()).unwrap();
        assert_eq!(sale.unpause(admin()), Err(SaleError::NotPaused));
    }
}
