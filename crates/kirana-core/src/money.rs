//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A checkout that drifts by a paisa per line does not balance against   │
//! │  its tenders, and an unbalanced receipt is a financial bug.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹120.00 is 12000 paise. Every derived amount is computed in         │
//! │    integer arithmetic and rounded half-up exactly once.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let mrp = Money::from_paise(12000);           // ₹120.00
//! let tax = mrp.percent_bps(500);               // 5% GST = ₹6.00
//! assert_eq!(tax, Some(Money::from_paise(600)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::types::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest INR unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for reversals and change math
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the engine flows through this type: unit prices,
/// line discounts, taxes, totals, tender amounts, and change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let mrp = Money::from_paise(12000); // ₹120.00
    /// assert_eq!(mrp.paise(), 12000);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }

    /// Multiplies by a fractional quantity, rounding half-up to the paisa.
    ///
    /// Quantities carry milli-unit precision (1.250 kg = 1250), so the raw
    /// product is a thousandth of a paisa. The +500 term rounds it half-up.
    ///
    /// Returns `None` when the result does not fit in an `i64` paisa amount;
    /// the intermediate product is exact in `i128` either way.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::types::Quantity;
    ///
    /// let rate = Money::from_paise(4550);        // ₹45.50 per kg
    /// let base = rate.times(Quantity::from_milli(1500)); // 1.5 kg
    /// assert_eq!(base, Some(Money::from_paise(6825)));   // ₹68.25
    /// ```
    pub fn times(&self, qty: Quantity) -> Option<Money> {
        // i128 keeps the product exact; the final narrowing is checked
        let raw = self.0 as i128 * qty.milli() as i128;
        round_half_up(raw, 1000).map(Money)
    }

    /// Takes a percentage expressed in basis points, rounding half-up.
    ///
    /// 1 basis point = 0.01%, so 500 bps = 5% GST. Returns `None` when the
    /// result does not fit in an `i64` paisa amount (possible for rates above
    /// 100% on amounts near the range limit).
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let base = Money::from_paise(10800); // ₹108.00
    /// let tax = base.percent_bps(500);     // 5%
    /// assert_eq!(tax, Some(Money::from_paise(540)));
    /// ```
    pub fn percent_bps(&self, bps: u32) -> Option<Money> {
        let raw = self.0 as i128 * bps as i128;
        round_half_up(raw, 10_000).map(Money)
    }

    /// Splits an amount in half, returning `(half, remainder_half)`.
    ///
    /// The two parts always sum back to the original amount; an odd paisa
    /// lands in the second part. Used for the CGST/SGST split.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let tax = Money::from_paise(541);
    /// let (cgst, sgst) = tax.halves();
    /// assert_eq!(cgst.paise(), 270);
    /// assert_eq!(sgst.paise(), 271);
    /// ```
    pub fn halves(&self) -> (Money, Money) {
        let half = self.0 / 2;
        (Money(half), Money(self.0 - half))
    }
}

/// Rounds `numerator / denominator` half-up. Sign-aware: -0.5 rounds to -1.
/// `None` when the quotient is outside the `i64` range.
fn round_half_up(numerator: i128, denominator: i128) -> Option<i64> {
    let half = denominator / 2;
    let adjusted = if numerator >= 0 {
        numerator + half
    } else {
        numerator - half
    };
    i64::try_from(adjusted / denominator).ok()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for logs and debugging. Receipt rendering is an external
/// collaborator and never relies on this formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(12099);
        assert_eq!(money.paise(), 12099);
        assert_eq!(money.rupees(), 120);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(12099)), "₹120.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!([a, b, b].into_iter().sum::<Money>().paise(), 2000);
    }

    #[test]
    fn test_times_whole_quantity() {
        let price = Money::from_paise(299);
        assert_eq!(price.times(Quantity::from_units(3)), Some(Money::from_paise(897)));
    }

    #[test]
    fn test_times_fractional_quantity_rounds_half_up() {
        // ₹45.50/kg × 1.5 kg = ₹68.25 exactly
        let rate = Money::from_paise(4550);
        assert_eq!(rate.times(Quantity::from_milli(1500)), Some(Money::from_paise(6825)));

        // ₹1.01 × 0.005 = 0.505 paise → rounds to 1 paisa
        let tiny = Money::from_paise(101);
        assert_eq!(tiny.times(Quantity::from_milli(5)), Some(Money::from_paise(1)));
    }

    #[test]
    fn test_times_overflow_is_detected() {
        // ₹120.00 at the largest representable quantity would wrap an i64;
        // the checked narrowing must catch it instead of going negative.
        let price = Money::from_paise(12000);
        assert_eq!(price.times(Quantity::from_milli(i64::MAX)), None);
        assert_eq!(price.times(Quantity::from_milli(i64::MIN)), None);

        // The exact edge still fits: i64::MAX paise × 1.000 units.
        let edge = Money::from_paise(i64::MAX);
        assert_eq!(edge.times(Quantity::from_units(1)), Some(edge));
        assert_eq!(edge.times(Quantity::from_units(2)), None);
    }

    #[test]
    fn test_percent_bps_exact() {
        // ₹120.00 at 5% = ₹6.00
        let amount = Money::from_paise(12000);
        assert_eq!(amount.percent_bps(500), Some(Money::from_paise(600)));
    }

    #[test]
    fn test_percent_bps_rounds_half_up() {
        // ₹10.00 at 8.25% = 82.5 paise → 83 paise
        let amount = Money::from_paise(1000);
        assert_eq!(amount.percent_bps(825), Some(Money::from_paise(83)));

        // 49.999% of 1 paisa rounds down
        assert_eq!(Money::from_paise(1).percent_bps(4999), Some(Money::zero()));
        // 50% of 1 paisa rounds up
        assert_eq!(Money::from_paise(1).percent_bps(5000), Some(Money::from_paise(1)));
    }

    #[test]
    fn test_percent_bps_overflow_is_detected() {
        // 200% of i64::MAX paise does not fit; ≤ 100% always does.
        let amount = Money::from_paise(i64::MAX);
        assert_eq!(amount.percent_bps(20_000), None);
        assert_eq!(amount.percent_bps(10_000), Some(amount));
    }

    #[test]
    fn test_halves_preserve_sum() {
        for paise in [0, 1, 540, 541, 99999] {
            let tax = Money::from_paise(paise);
            let (cgst, sgst) = tax.halves();
            assert_eq!((cgst + sgst).paise(), paise);
            assert!((sgst - cgst).paise() <= 1);
        }
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_paise(100).is_positive());
        assert!(Money::from_paise(-100).is_negative());
    }

    #[test]
    fn test_min_max() {
        let a = Money::from_paise(100);
        let b = Money::from_paise(200);
        assert_eq!(a.min(b), a);
        assert_eq!(a.max(b), b);
    }
}
