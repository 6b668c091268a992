//! # Domain Types
//!
//! Core domain types used throughout Kirana Checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │     Receipt     │   │  ReceiptTender  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode        │   │  receipt_number │   │  method         │       │
//! │  │  mrp_paise      │   │  cgst/sgst/igst │   │  amount_paise   │       │
//! │  │  tax_rate_id    │   │  grand_total    │   │  reference      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Quantity     │   │   TenderMethod  │   │ StockLedgerEntry│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  milli (i64)    │   │  CASH, CARD,    │   │  delta_milli    │       │
//! │  │  1500 = 1.500   │   │  UPI, WALLET...│   │  reference      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A cart line freezes the item's name, price, and tax rate at the moment
//! the line is created. Catalog edits after that moment never reach back
//! into an open cart or a settled receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Quantity
// =============================================================================

/// A quantity in milli-units (1000 = 1.000).
///
/// ## Why Milli-Units?
/// Weighable items sell in fractions (1.250 kg of dal). Keeping three
/// decimal places in an integer keeps all pricing math in integer
/// arithmetic, the same trick `Money` uses for paise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Creates a quantity from milli-units.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the quantity in milli-units.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// An active cart line requires a positive quantity.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Negation, used when posting a sale to the stock ledger.
    #[inline]
    pub const fn negated(&self) -> Self {
        Quantity(-self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}", self.0 / 1000)
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            write!(f, "{}{}.{:03}", sign, (self.0 / 1000).abs(), (self.0 % 1000).abs())
        }
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// A GST tax rate from the catalog.
///
/// ## Basis Points
/// 1 basis point = 0.01%, so 500 bps = 5% GST. The cess component (e.g.
/// on aerated drinks) is carried separately and added into the effective
/// rate applied to a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TaxRate {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("GST 5%", "GST 28% + cess").
    pub name: String,

    /// Base GST rate in basis points (500 = 5%).
    pub rate_bps: u32,

    /// Compensation cess in basis points, 0 for most goods.
    pub cess_bps: u32,
}

impl TaxRate {
    /// The rate actually applied to a line base.
    #[inline]
    pub fn effective_bps(&self) -> u32 {
        self.rate_bps + self.cess_bps
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item. Read-only to the checkout core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Scannable code (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Maximum retail price in paise.
    pub mrp_paise: i64,

    /// Tax rate reference; None means untaxed.
    pub tax_rate_id: Option<String>,

    /// Whether the item is sellable (soft delete).
    pub is_active: bool,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the MRP as a Money type.
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paise(self.mrp_paise)
    }
}

/// An item as seen at the moment a cart line is created.
///
/// The tax-rate reference is already resolved to basis points here, so
/// the pure cart never needs a catalog lookup. This is the value the
/// persistence layer hands to `Cart::add_line`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemSnapshot {
    /// Catalog item id.
    pub item_id: String,

    /// Name at snapshot time (frozen).
    pub name: String,

    /// Barcode at snapshot time (frozen).
    pub barcode: Option<String>,

    /// MRP in paise at snapshot time (frozen).
    pub mrp_paise: i64,

    /// Effective tax rate in basis points; 0 when the item has no rate.
    pub tax_bps: u32,
}

impl ItemSnapshot {
    /// Returns the snapshotted price as Money.
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paise(self.mrp_paise)
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Lifecycle state of a cart.
///
/// ```text
/// Open ──(settle validates)──► Settling ──(persisted)──► Settled
///   │                             │
///   │                             └──(persistence failed)──► Open
///   └──(abandon)──► Discarded
/// ```
///
/// `Settling` is never observable from outside the settlement engine: the
/// per-cart lock is held across the whole transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    /// Cart accepts mutations and tenders.
    #[default]
    Open,
    /// Settlement in flight; persistence call outstanding.
    Settling,
    /// Converted to a receipt; terminal.
    Settled,
    /// Abandoned without a sale; terminal.
    Discarded,
}

// =============================================================================
// Tender Method
// =============================================================================

/// Payment instrument for a tender.
///
/// This is a CLOSED set: an unrecognized method code posted by a caller is
/// rejected as `InvalidTender`, never auto-created.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal.
    Card,
    /// UPI transfer.
    Upi,
    /// Wallet app payment.
    Wallet,
    /// Store-issued gift card.
    GiftCard,
    /// Store credit balance.
    StoreCredit,
}

impl TenderMethod {
    /// The wire code for this method.
    pub const fn code(&self) -> &'static str {
        match self {
            TenderMethod::Cash => "CASH",
            TenderMethod::Card => "CARD",
            TenderMethod::Upi => "UPI",
            TenderMethod::Wallet => "WALLET",
            TenderMethod::GiftCard => "GIFT_CARD",
            TenderMethod::StoreCredit => "STORE_CREDIT",
        }
    }

    /// Parses a method code, case-insensitively. Returns None for codes
    /// outside the recognized set.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CASH" => Some(TenderMethod::Cash),
            "CARD" => Some(TenderMethod::Card),
            "UPI" => Some(TenderMethod::Upi),
            "WALLET" => Some(TenderMethod::Wallet),
            "GIFT_CARD" => Some(TenderMethod::GiftCard),
            "STORE_CREDIT" => Some(TenderMethod::StoreCredit),
            _ => None,
        }
    }
}

impl fmt::Display for TenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Capture status of a persisted tender.
///
/// The engine currently records every settled tender as `Success`; a
/// partial/failed capture state does not exist in this model.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderStatus {
    Success,
}

// =============================================================================
// Receipt
// =============================================================================

/// The immutable record of a completed sale.
///
/// Created exactly once by the settlement engine; never mutated after.
/// Corrections are modeled as a new reversing receipt, not an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Receipt {
    pub id: String,
    /// Human-readable, unique: `RCP-YYYYMMDD-NNNN`.
    pub receipt_number: String,
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    /// Central GST share: half the total tax.
    pub cgst_paise: i64,
    /// State GST share: the other half (odd paisa lands here).
    pub sgst_paise: i64,
    /// Inter-state GST; always 0 under the intra-state-only policy.
    pub igst_paise: i64,
    pub grand_total_paise: i64,
    pub paid_paise: i64,
    pub change_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_paise(self.grand_total_paise)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_paise(self.tax_paise)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_paise(self.change_paise)
    }
}

/// A line snapshot on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReceiptLine {
    pub id: String,
    pub receipt_id: String,
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity_milli: i64,
    pub unit_price_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub total_paise: i64,
    /// Tape position, 0-based insertion order.
    pub line_no: i64,
}

impl ReceiptLine {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

/// A tender snapshot on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReceiptTender {
    pub id: String,
    pub receipt_id: String,
    pub method: TenderMethod,
    pub amount_paise: i64,
    /// Transaction id for electronic methods.
    pub reference: Option<String>,
    pub status: TenderStatus,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// A signed stock movement tied to a receipt.
///
/// Sales post negative deltas. One entry per settled line, written in the
/// same transaction as the receipt, so stock can never be decremented
/// without a receipt nor twice for one sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLedgerEntry {
    pub id: String,
    pub item_id: String,
    /// Signed quantity delta in milli-units; negative for sales.
    pub delta_milli: i64,
    /// The receipt number this movement belongs to.
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::from_units(3).to_string(), "3");
        assert_eq!(Quantity::from_milli(1500).to_string(), "1.500");
        assert_eq!(Quantity::from_milli(-250).to_string(), "-0.250");
    }

    #[test]
    fn test_quantity_negated() {
        assert_eq!(Quantity::from_milli(1500).negated().milli(), -1500);
    }

    #[test]
    fn test_tax_rate_effective_bps() {
        let rate = TaxRate {
            id: "t1".to_string(),
            name: "GST 28% + cess".to_string(),
            rate_bps: 2800,
            cess_bps: 1200,
        };
        assert_eq!(rate.effective_bps(), 4000);
    }

    #[test]
    fn test_tender_method_round_trip() {
        for method in [
            TenderMethod::Cash,
            TenderMethod::Card,
            TenderMethod::Upi,
            TenderMethod::Wallet,
            TenderMethod::GiftCard,
            TenderMethod::StoreCredit,
        ] {
            assert_eq!(TenderMethod::parse(method.code()), Some(method));
        }
    }

    #[test]
    fn test_tender_method_parse_is_case_insensitive() {
        assert_eq!(TenderMethod::parse("upi"), Some(TenderMethod::Upi));
        assert_eq!(TenderMethod::parse(" gift_card "), Some(TenderMethod::GiftCard));
    }

    #[test]
    fn test_tender_method_rejects_unknown_codes() {
        assert_eq!(TenderMethod::parse("CHEQUE"), None);
        assert_eq!(TenderMethod::parse(""), None);
    }

    #[test]
    fn test_tender_method_serde_codes() {
        let json = serde_json::to_string(&TenderMethod::GiftCard).unwrap();
        assert_eq!(json, "\"GIFT_CARD\"");
    }

    #[test]
    fn test_cart_state_default_is_open() {
        assert_eq!(CartState::default(), CartState::Open);
    }
}
