//! # Tender Ledger
//!
//! Accumulates payments (tenders) against a cart's grand total and decides
//! how much is still due or owed back as change.
//!
//! ## Ledger Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  paid   = Σ tender.amount                                               │
//! │  due    = max(0, grand_total − paid)                                    │
//! │  change = max(0, paid − grand_total)                                    │
//! │                                                                         │
//! │  The ledger itself never caps overpayment; whether `due > 0` blocks    │
//! │  completion is settlement policy, decided by the engine.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tenders are append-only until settlement, with one escape hatch:
//! `remove` drops a mis-entered tender before settlement. That is a ledger
//! operation, not a cart operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CartError, CoreResult};
use crate::money::Money;
use crate::types::TenderMethod;

// =============================================================================
// Tender
// =============================================================================

/// One payment instrument/amount contributed toward settling a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tender {
    /// Payment method from the closed set.
    pub method: TenderMethod,

    /// Amount in paise; always positive.
    pub amount: Money,

    /// Transaction id for electronic methods (UPI ref, card auth code).
    pub reference: Option<String>,

    /// When the tender was recorded.
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Tender Ledger
// =============================================================================

/// The set of tenders accumulated against one cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenderLedger {
    tenders: Vec<Tender>,
}

impl TenderLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        TenderLedger { tenders: Vec::new() }
    }

    /// Records a tender.
    ///
    /// Fails `InvalidTender` when the amount is not positive. The method is
    /// already typed here; parsing an unrecognized code fails upstream.
    pub fn add(
        &mut self,
        method: TenderMethod,
        amount: Money,
        reference: Option<String>,
    ) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CartError::invalid_tender(format!(
                "amount must be positive, got {amount}"
            )));
        }
        self.tenders.push(Tender {
            method,
            amount,
            reference,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    /// Removes a mis-entered tender before settlement.
    pub fn remove(&mut self, index: usize) -> CoreResult<Tender> {
        if index >= self.tenders.len() {
            return Err(CartError::invalid_tender(format!("no tender at index {index}")));
        }
        Ok(self.tenders.remove(index))
    }

    /// The recorded tenders, in entry order.
    pub fn tenders(&self) -> &[Tender] {
        &self.tenders
    }

    /// Checks if no tenders are recorded.
    pub fn is_empty(&self) -> bool {
        self.tenders.is_empty()
    }

    /// Σ tender.amount.
    pub fn paid(&self) -> Money {
        self.tenders.iter().map(|t| t.amount).sum()
    }

    /// What is still owed toward `grand_total`; never negative.
    pub fn due(&self, grand_total: Money) -> Money {
        (grand_total - self.paid()).max(Money::zero())
    }

    /// What must be returned to the customer; never negative.
    pub fn change(&self, grand_total: Money) -> Money {
        (self.paid() - grand_total).max(Money::zero())
    }

    /// True when the tenders fully cover the grand total.
    pub fn covers(&self, grand_total: Money) -> bool {
        self.paid() >= grand_total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paise(p: i64) -> Money {
        Money::from_paise(p)
    }

    #[test]
    fn test_add_and_sum() {
        let mut ledger = TenderLedger::new();
        ledger.add(TenderMethod::Upi, paise(5670), Some("upi-txn-1".into())).unwrap();
        ledger.add(TenderMethod::Cash, paise(5670), None).unwrap();

        assert_eq!(ledger.tenders().len(), 2);
        assert_eq!(ledger.paid().paise(), 11340);
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let mut ledger = TenderLedger::new();
        assert!(matches!(
            ledger.add(TenderMethod::Cash, Money::zero(), None),
            Err(CartError::InvalidTender { .. })
        ));
        assert!(matches!(
            ledger.add(TenderMethod::Card, paise(-100), None),
            Err(CartError::InvalidTender { .. })
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_due_and_change_to_the_paisa() {
        let mut ledger = TenderLedger::new();
        ledger.add(TenderMethod::Cash, paise(10000), None).unwrap();

        let total = paise(11340);
        assert_eq!(ledger.due(total).paise(), 1340);
        assert_eq!(ledger.change(total).paise(), 0);
        assert!(!ledger.covers(total));

        ledger.add(TenderMethod::Upi, paise(2000), None).unwrap();
        assert_eq!(ledger.due(total).paise(), 0);
        assert_eq!(ledger.change(total).paise(), 660);
        assert!(ledger.covers(total));
    }

    #[test]
    fn test_exact_split_payment() {
        let mut ledger = TenderLedger::new();
        ledger.add(TenderMethod::Upi, paise(5670), None).unwrap();
        ledger.add(TenderMethod::Cash, paise(5670), None).unwrap();

        let total = paise(11340);
        assert_eq!(ledger.due(total), Money::zero());
        assert_eq!(ledger.change(total), Money::zero());
        assert!(ledger.covers(total));
    }

    #[test]
    fn test_remove_tender() {
        let mut ledger = TenderLedger::new();
        ledger.add(TenderMethod::Cash, paise(100), None).unwrap();
        ledger.add(TenderMethod::Card, paise(200), Some("auth-9".into())).unwrap();

        let removed = ledger.remove(0).unwrap();
        assert_eq!(removed.method, TenderMethod::Cash);
        assert_eq!(ledger.paid().paise(), 200);

        assert!(matches!(ledger.remove(7), Err(CartError::InvalidTender { .. })));
    }
}
