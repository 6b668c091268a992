//! # Settlement Engine
//!
//! Turns an open cart plus its tender ledger into a settlement draft:
//! preconditions checked in a fixed order, totals frozen, GST split into
//! its CGST/SGST halves.
//!
//! ## Precondition Order
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  1. cart has lines        else EmptyCart                     │
//! │  2. at least one tender   else NoPayment                     │
//! │  3. paid ≥ grand total    else InsufficientPayment { due }   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//! The order is observable: an empty cart with no payment reports
//! `EmptyCart`, not `NoPayment`. State is checked by the service before
//! the engine runs, so `CartNotOpen` always wins over all three.
//!
//! ## GST Split
//! Intra-state sale: total tax splits into CGST = tax / 2 (floor) and
//! SGST = tax − CGST, so an odd paisa lands in SGST and the two halves
//! always sum back to the tax. IGST is recorded as zero.

use kirana_core::{Cart, TenderLedger};
use kirana_db::{DraftLine, DraftTender, SettlementDraft};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Validation
// =============================================================================

/// Checks the settlement preconditions, in order.
pub fn validate(cart: &Cart, tenders: &TenderLedger) -> CheckoutResult<()> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart(cart.id.clone()));
    }
    if tenders.is_empty() {
        return Err(CheckoutError::NoPayment(cart.id.clone()));
    }
    let grand_total = cart.grand_total();
    if !tenders.covers(grand_total) {
        return Err(CheckoutError::InsufficientPayment {
            due_paise: tenders.due(grand_total).paise(),
        });
    }
    Ok(())
}

// =============================================================================
// Draft Construction
// =============================================================================

/// Freezes the cart and ledger into a persistence-ready draft.
///
/// Assumes `validate` has passed. Every amount is lifted from the cart's
/// derived totals; this function introduces no arithmetic of its own
/// beyond the GST split and the change computation.
pub fn build_draft(cart: &Cart, tenders: &TenderLedger) -> SettlementDraft {
    let grand_total = cart.grand_total();
    let tax = cart.total_tax();
    let (cgst, sgst) = tax.halves();

    SettlementDraft {
        subtotal_paise: cart.subtotal().paise(),
        discount_paise: cart.total_discount().paise(),
        tax_paise: tax.paise(),
        cgst_paise: cgst.paise(),
        sgst_paise: sgst.paise(),
        igst_paise: 0,
        grand_total_paise: grand_total.paise(),
        paid_paise: tenders.paid().paise(),
        change_paise: tenders.change(grand_total).paise(),
        lines: cart
            .lines
            .iter()
            .map(|line| DraftLine {
                item_id: line.item_id.clone(),
                name: line.name.clone(),
                quantity_milli: line.quantity.milli(),
                unit_price_paise: line.unit_price.paise(),
                discount_paise: line.discount.paise(),
                tax_paise: line.tax.paise(),
                total_paise: line.total.paise(),
            })
            .collect(),
        tenders: tenders
            .tenders()
            .iter()
            .map(|tender| DraftTender {
                method: tender.method,
                amount_paise: tender.amount.paise(),
                reference: tender.reference.clone(),
            })
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::{ItemSnapshot, Money, Quantity, TenderMethod};

    fn snapshot(id: &str, mrp_paise: i64, tax_bps: u32) -> ItemSnapshot {
        ItemSnapshot {
            item_id: id.to_string(),
            name: format!("Item {id}"),
            barcode: None,
            mrp_paise,
            tax_bps,
        }
    }

    fn cart_with_one_line() -> Cart {
        let mut cart = Cart::new("cart-1");
        cart.add_line(&snapshot("itm-1", 12000, 500), Quantity::from_units(1))
            .unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_wins_over_no_payment() {
        let cart = Cart::new("cart-1");
        let tenders = TenderLedger::new();

        let err = validate(&cart, &tenders).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart("cart-1".to_string()));
    }

    #[test]
    fn test_no_payment_before_insufficiency() {
        let cart = cart_with_one_line();
        let tenders = TenderLedger::new();

        let err = validate(&cart, &tenders).unwrap_err();
        assert_eq!(err, CheckoutError::NoPayment("cart-1".to_string()));
    }

    #[test]
    fn test_insufficient_payment_reports_exact_due() {
        // ₹120.00 @ 5% → total ₹126.00; ₹100.00 tendered → ₹26.00 due.
        let cart = cart_with_one_line();
        let mut tenders = TenderLedger::new();
        tenders
            .add(TenderMethod::Cash, Money::from_paise(10000), None)
            .unwrap();

        let err = validate(&cart, &tenders).unwrap_err();
        assert_eq!(err, CheckoutError::InsufficientPayment { due_paise: 2600 });
    }

    #[test]
    fn test_exact_payment_validates() {
        let cart = cart_with_one_line();
        let mut tenders = TenderLedger::new();
        tenders
            .add(TenderMethod::Upi, Money::from_paise(12600), None)
            .unwrap();

        assert!(validate(&cart, &tenders).is_ok());
    }

    #[test]
    fn test_draft_totals_and_gst_split() {
        let mut cart = Cart::new("cart-1");
        cart.add_line(&snapshot("itm-1", 12000, 500), Quantity::from_units(1))
            .unwrap();
        cart.apply_cart_discount(1000).unwrap(); // 10% off

        let mut tenders = TenderLedger::new();
        tenders
            .add(TenderMethod::Upi, Money::from_paise(5670), Some("upi-ref-1".into()))
            .unwrap();
        tenders
            .add(TenderMethod::Cash, Money::from_paise(5670), None)
            .unwrap();

        let draft = build_draft(&cart, &tenders);

        assert_eq!(draft.subtotal_paise, 12000);
        assert_eq!(draft.discount_paise, 1200);
        assert_eq!(draft.tax_paise, 540);
        assert_eq!(draft.cgst_paise, 270);
        assert_eq!(draft.sgst_paise, 270);
        assert_eq!(draft.igst_paise, 0);
        assert_eq!(draft.grand_total_paise, 11340);
        assert_eq!(draft.paid_paise, 11340);
        assert_eq!(draft.change_paise, 0);

        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity_milli, 1000);
        assert_eq!(draft.tenders.len(), 2);
        assert_eq!(draft.tenders[0].reference.as_deref(), Some("upi-ref-1"));
    }

    #[test]
    fn test_odd_tax_paisa_lands_in_sgst() {
        let mut cart = Cart::new("cart-1");
        // ₹1.10 @ 5% → tax 6 paise? 110 * 500 / 10000 = 5.5 → 6.
        cart.add_line(&snapshot("itm-1", 110, 500), Quantity::from_units(1))
            .unwrap();
        let mut tenders = TenderLedger::new();
        tenders
            .add(TenderMethod::Cash, Money::from_paise(200), None)
            .unwrap();

        let draft = build_draft(&cart, &tenders);

        assert_eq!(draft.tax_paise, 6);
        assert_eq!(draft.cgst_paise, 3);
        assert_eq!(draft.sgst_paise, 3);

        // tax = 7 splits 3 / 4.
        let (cgst, sgst) = Money::from_paise(7).halves();
        assert_eq!(cgst.paise(), 3);
        assert_eq!(sgst.paise(), 4);
    }

    #[test]
    fn test_overpayment_yields_change() {
        let cart = cart_with_one_line();
        let mut tenders = TenderLedger::new();
        tenders
            .add(TenderMethod::Cash, Money::from_paise(15000), None)
            .unwrap();

        assert!(validate(&cart, &tenders).is_ok());
        let draft = build_draft(&cart, &tenders);
        assert_eq!(draft.grand_total_paise, 12600);
        assert_eq!(draft.paid_paise, 15000);
        assert_eq!(draft.change_paise, 2400);
    }
}
