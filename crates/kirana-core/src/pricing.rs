//! # Line Pricer
//!
//! Computes a single cart line's tax and total from unit price, quantity,
//! discount, and tax rate. Pure and deterministic: the same inputs always
//! produce the same priced line, with no side effects.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       price_line()                                      │
//! │                                                                         │
//! │  unit_price × quantity ──► base        (rounded half-up to the paisa)  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  discount clamped to [0, base] ──► effective discount                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  (base − discount) × tax_bps / 10000 ──► tax  (rounded half-up)        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  total = base − discount + tax                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rounding happens exactly once per derived figure; nothing downstream
//! re-rounds, so the line invariant `total == base − discount + tax` holds
//! to the paisa.

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CoreResult};
use crate::money::Money;
use crate::types::Quantity;

// =============================================================================
// Priced Line
// =============================================================================

/// The output of the line pricer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Pre-discount, pre-tax base: unit price × quantity.
    pub base: Money,

    /// The discount actually applied (input clamped to `[0, base]`).
    pub discount: Money,

    /// Tax on the discounted base.
    pub tax: Money,

    /// base − discount + tax.
    pub total: Money,
}

// =============================================================================
// Pricer
// =============================================================================

/// Prices one line.
///
/// ## Contract
/// - `unit_price ≥ 0` and `quantity > 0` are the caller's concern; the cart
///   aggregate validates them before calling here. With a non-positive
///   quantity the base goes negative and the effective discount is forced
///   to 0, so the clamp documented below still holds.
/// - A discount above the base is clamped to the base, never producing a
///   negative taxable amount. A negative discount input is treated as 0.
/// - `tax_bps` of 0 means untaxed.
/// - Any derived figure falling outside the `i64` paisa range is an error,
///   never a wrapped value: `InvalidQuantity` for the base,
///   `InvalidPrice` for tax and total.
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::pricing::price_line;
/// use kirana_core::types::Quantity;
///
/// // ₹120.00 × 1 at 5% GST
/// let priced = price_line(
///     Money::from_paise(12000),
///     Quantity::from_units(1),
///     Money::zero(),
///     500,
/// ).unwrap();
/// assert_eq!(priced.tax.paise(), 600);    // ₹6.00
/// assert_eq!(priced.total.paise(), 12600); // ₹126.00
/// ```
pub fn price_line(
    unit_price: Money,
    quantity: Quantity,
    discount: Money,
    tax_bps: u32,
) -> CoreResult<PricedLine> {
    let base = unit_price
        .times(quantity)
        .ok_or_else(|| CartError::invalid_quantity("line base exceeds the representable amount"))?;

    // Clamp: never negative, never more than the (non-negative) base.
    let discount = discount.clamp(Money::zero(), base.max(Money::zero()));

    let taxable = base - discount;
    let tax = taxable
        .percent_bps(tax_bps)
        .ok_or_else(|| CartError::invalid_price("line tax exceeds the representable amount"))?;

    let total = taxable
        .paise()
        .checked_add(tax.paise())
        .map(Money::from_paise)
        .ok_or_else(|| CartError::invalid_price("line total exceeds the representable amount"))?;

    Ok(PricedLine { base, discount, tax, total })
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
    fn test_untaxed_line() {
        let priced = price_line(paise(999), Quantity::from_units(2), Money::zero(), 0).unwrap();
        assert_eq!(priced.base.paise(), 1998);
        assert_eq!(priced.tax.paise(), 0);
        assert_eq!(priced.total.paise(), 1998);
    }

    #[test]
    fn test_reference_scenario_no_discount() {
        // ₹120.00 × 1 at 5% → tax ₹6.00, total ₹126.00
        let priced = price_line(paise(12000), Quantity::from_units(1), Money::zero(), 500).unwrap();
        assert_eq!(priced.tax.paise(), 600);
        assert_eq!(priced.total.paise(), 12600);
    }

    #[test]
    fn test_reference_scenario_with_ten_percent_discount() {
        // Same line with a ₹12.00 discount → tax ₹5.40, total ₹113.40
        let priced = price_line(paise(12000), Quantity::from_units(1), paise(1200), 500).unwrap();
        assert_eq!(priced.discount.paise(), 1200);
        assert_eq!(priced.tax.paise(), 540);
        assert_eq!(priced.total.paise(), 11340);
    }

    #[test]
    fn test_discount_clamped_to_base() {
        // ₹50 discount on a ₹20 line: base fully discounted, nothing taxed
        let priced = price_line(paise(2000), Quantity::from_units(1), paise(5000), 1800).unwrap();
        assert_eq!(priced.discount.paise(), 2000);
        assert_eq!(priced.tax.paise(), 0);
        assert_eq!(priced.total.paise(), 0);
    }

    #[test]
    fn test_negative_discount_treated_as_zero() {
        let priced = price_line(paise(2000), Quantity::from_units(1), paise(-500), 0).unwrap();
        assert_eq!(priced.discount.paise(), 0);
        assert_eq!(priced.total.paise(), 2000);
    }

    #[test]
    fn test_negative_base_gets_no_discount() {
        // Outside the cart's contract (quantity ≤ 0), but the clamp must
        // still hold: the effective discount stays at 0, never negative.
        let priced = price_line(paise(2000), Quantity::from_milli(-1000), paise(500), 0).unwrap();
        assert_eq!(priced.base.paise(), -2000);
        assert_eq!(priced.discount, Money::zero());
        assert_eq!(priced.total.paise(), -2000);
    }

    #[test]
    fn test_fractional_quantity() {
        // ₹45.50/kg × 1.5 kg at 5% → base ₹68.25, tax ₹3.41 (341.25 → 341)
        let priced =
            price_line(paise(4550), Quantity::from_milli(1500), Money::zero(), 500).unwrap();
        assert_eq!(priced.base.paise(), 6825);
        assert_eq!(priced.tax.paise(), 341);
        assert_eq!(priced.total.paise(), 7166);
    }

    #[test]
    fn test_overflowing_base_is_an_error() {
        // ₹120.00 at the largest representable quantity wraps an i64 if left
        // unchecked; the pricer must refuse it rather than emit a negative base.
        let err = price_line(paise(12000), Quantity::from_milli(i64::MAX), Money::zero(), 500)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_overflowing_tax_is_an_error() {
        // A compensation-cess style rate above 100% on an amount near the
        // range limit overflows at the tax step, not the base step.
        let err = price_line(paise(i64::MAX), Quantity::from_units(1), Money::zero(), 20_000)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice { .. }));
    }

    #[test]
    fn test_line_invariant_holds_across_inputs() {
        // total == base − discount + tax, tax never negative
        let cases = [
            (12000, 1000, 0, 500),
            (12000, 1000, 1200, 500),
            (999, 3000, 100, 1800),
            (4550, 1250, 0, 2800),
            (1, 1, 0, 9999),
            (0, 5000, 0, 1200),
        ];
        for (price, qty_milli, disc, bps) in cases {
            let priced =
                price_line(paise(price), Quantity::from_milli(qty_milli), paise(disc), bps)
                    .unwrap();
            assert!(!priced.tax.is_negative());
            assert_eq!(priced.total, priced.base - priced.discount + priced.tax);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = price_line(paise(12345), Quantity::from_milli(2750), paise(500), 1800).unwrap();
        let b = price_line(paise(12345), Quantity::from_milli(2750), paise(500), 1800).unwrap();
        assert_eq!(a, b);
    }
}
