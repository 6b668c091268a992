//! # Cart Aggregate
//!
//! An ordered collection of priced lines plus derived totals. Mutable while
//! `Open`; consumed exactly once by the settlement engine.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Aggregate Operations                            │
//! │                                                                         │
//! │  Scan item ──────────► add_line() ─────────► lines.push(line)          │
//! │                                              (never merges: each scan  │
//! │                                               is its own tape line)    │
//! │                                                                         │
//! │  Edit qty/price/disc ► update_line(i) ─────► reprice via line pricer   │
//! │                                              (qty ≤ 0 deletes instead) │
//! │                                                                         │
//! │  Void a line ────────► remove_line(i) ─────► lines.remove(i)           │
//! │                                                                         │
//! │  Whole-cart % off ───► apply_cart_discount ► every line's discount     │
//! │                                              re-derived from its base  │
//! │                                                                         │
//! │  Totals ─────────────► subtotal()/etc ─────► fold over lines, always   │
//! │                                              (never cached)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every mutation requires `CartState::Open`, else `CartError::NotOpen`
//! - Line order is insertion order; index-addressed operations use it
//! - `grand_total() == Σ line.total` at every observation point, because
//!   totals are computed on demand from the lines and nowhere else

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CartError, CoreResult};
use crate::money::Money;
use crate::pricing::{price_line, PricedLine};
use crate::types::{CartState, ItemSnapshot, Quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// One priced entry in a cart, corresponding to one scan of an item.
///
/// ## Snapshot Pattern
/// `name`, `barcode`, and `unit_price` are frozen from the catalog at the
/// moment the line is created. The unit price stays independently editable
/// afterwards (price override at the till), but a catalog edit never
/// reaches back into an existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog item id.
    pub item_id: String,

    /// Item name at time of adding (frozen).
    pub name: String,

    /// Barcode at time of adding (frozen).
    pub barcode: Option<String>,

    /// Quantity in milli-units; always positive while the line exists.
    pub quantity: Quantity,

    /// Unit price in paise; snapshotted, then independently editable.
    pub unit_price: Money,

    /// Pre-discount, pre-tax base: unit price × quantity, derived by the
    /// pricer alongside the other figures.
    pub base: Money,

    /// Absolute line discount; `0 ≤ discount ≤ base`.
    pub discount: Money,

    /// Effective tax rate in basis points; 0 for untaxed items.
    pub tax_bps: u32,

    /// Derived tax amount; recomputed through the pricer on every mutation.
    pub tax: Money,

    /// Derived line total: base − discount + tax.
    pub total: Money,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_snapshot(snapshot: &ItemSnapshot, quantity: Quantity) -> CoreResult<Self> {
        let priced = price_line(snapshot.mrp(), quantity, Money::zero(), snapshot.tax_bps)?;
        Ok(CartLine {
            item_id: snapshot.item_id.clone(),
            name: snapshot.name.clone(),
            barcode: snapshot.barcode.clone(),
            quantity,
            unit_price: snapshot.mrp(),
            base: priced.base,
            discount: priced.discount,
            tax_bps: snapshot.tax_bps,
            tax: priced.tax,
            total: priced.total,
            added_at: Utc::now(),
        })
    }

    /// Copies the pricer's output into the derived fields.
    fn apply_pricing(&mut self, priced: PricedLine) {
        self.base = priced.base;
        self.discount = priced.discount;
        self.tax = priced.tax;
        self.total = priced.total;
    }
}

// =============================================================================
// Line Patch
// =============================================================================

/// A partial update for one cart line. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinePatch {
    /// New quantity; `≤ 0` deletes the line.
    pub quantity: Option<Quantity>,

    /// Price override; must be ≥ 0.
    pub unit_price: Option<Money>,

    /// New absolute discount; must be ≥ 0 (clamped to the base above it).
    pub discount: Option<Money>,
}

// =============================================================================
// Cart
// =============================================================================

/// An in-progress, mutable collection of priced lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Opaque unique identifier (UUID v4).
    pub id: String,

    /// Lifecycle state; mutations require `Open`.
    pub state: CartState,

    /// Lines in insertion order.
    pub lines: Vec<CartLine>,

    /// When the cart was created.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty open cart with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Cart {
            id: id.into(),
            state: CartState::Open,
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.state == CartState::Open {
            Ok(())
        } else {
            Err(CartError::NotOpen)
        }
    }

    fn line_index(&self, index: usize) -> CoreResult<usize> {
        if index < self.lines.len() {
            Ok(index)
        } else {
            Err(CartError::LineNotFound { index })
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Appends a new line priced from the item snapshot.
    ///
    /// Never merges with an existing line for the same item: each scan
    /// produces its own line, matching a register tape.
    pub fn add_line(&mut self, snapshot: &ItemSnapshot, quantity: Quantity) -> CoreResult<()> {
        self.ensure_open()?;

        if !quantity.is_positive() {
            return Err(CartError::invalid_quantity(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        if snapshot.mrp_paise < 0 {
            return Err(CartError::invalid_price("unit price must not be negative"));
        }

        self.lines.push(CartLine::from_snapshot(snapshot, quantity)?);
        Ok(())
    }

    /// Applies a patch to the line at `index` and reprices it.
    ///
    /// A patched quantity ≤ 0 deletes the line instead; this is defined
    /// behavior, not error recovery.
    pub fn update_line(&mut self, index: usize, patch: LinePatch) -> CoreResult<()> {
        self.ensure_open()?;
        let index = self.line_index(index)?;

        if let Some(qty) = patch.quantity {
            if !qty.is_positive() {
                self.lines.remove(index);
                return Ok(());
            }
        }

        if let Some(price) = patch.unit_price {
            if price.is_negative() {
                return Err(CartError::invalid_price("unit price must not be negative"));
            }
        }
        if let Some(discount) = patch.discount {
            if discount.is_negative() {
                return Err(CartError::invalid_discount("discount must not be negative"));
            }
        }

        // Price the patched values first; the line is only touched once the
        // pricer accepts them, so a rejected patch leaves it as it was.
        let line = &mut self.lines[index];
        let quantity = patch.quantity.unwrap_or(line.quantity);
        let unit_price = patch.unit_price.unwrap_or(line.unit_price);
        let discount = patch.discount.unwrap_or(line.discount);
        let priced = price_line(unit_price, quantity, discount, line.tax_bps)?;

        line.quantity = quantity;
        line.unit_price = unit_price;
        line.apply_pricing(priced);
        Ok(())
    }

    /// Removes the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<()> {
        self.ensure_open()?;
        let index = self.line_index(index)?;
        self.lines.remove(index);
        Ok(())
    }

    /// Re-derives every line's discount as `percent` of that line's base.
    ///
    /// Overwrites any prior per-line discount (policy: whole-cart discounts
    /// replace manual ones, they do not compose), then reprices each line.
    /// Idempotent: each discount is a function of the base, which the
    /// discount itself never changes.
    ///
    /// `percent_bps` is the percentage in basis points: 1000 = 10%.
    pub fn apply_cart_discount(&mut self, percent_bps: u32) -> CoreResult<()> {
        self.ensure_open()?;

        if percent_bps > 10_000 {
            return Err(CartError::invalid_discount(format!(
                "discount percent must be within [0, 100], got {}.{:02}%",
                percent_bps / 100,
                percent_bps % 100
            )));
        }

        // Price every line before committing any, so a failure cannot leave
        // the cart with a half-applied discount.
        let mut repriced = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let discount = line.base.percent_bps(percent_bps).ok_or_else(|| {
                CartError::invalid_discount("discount amount exceeds the representable amount")
            })?;
            repriced.push(price_line(line.unit_price, line.quantity, discount, line.tax_bps)?);
        }
        for (line, priced) in self.lines.iter_mut().zip(repriced) {
            line.apply_pricing(priced);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle transitions (driven by the settlement engine)
    // -------------------------------------------------------------------------

    /// `Open → Settling`. The engine calls this after validation passes,
    /// before the persistence call.
    pub fn begin_settlement(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.state = CartState::Settling;
        Ok(())
    }

    /// `Settling → Settled`. Terminal.
    pub fn complete_settlement(&mut self) {
        debug_assert_eq!(self.state, CartState::Settling);
        self.state = CartState::Settled;
    }

    /// `Settling → Open`. The persistence call failed; the cart stays
    /// intact for retry.
    pub fn abort_settlement(&mut self) {
        debug_assert_eq!(self.state, CartState::Settling);
        self.state = CartState::Open;
    }

    /// `Open → Discarded`. Terminal; used when abandoning a cart.
    pub fn discard(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.state = CartState::Discarded;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Derived totals - computed on demand, never stored
    // -------------------------------------------------------------------------

    /// Σ line base (pre-discount, pre-tax).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.base).sum()
    }

    /// Σ line discount.
    pub fn total_discount(&self) -> Money {
        self.lines.iter().map(|l| l.discount).sum()
    }

    /// Σ line tax.
    pub fn total_tax(&self) -> Money {
        self.lines.iter().map(|l| l.tax).sum()
    }

    /// Σ line total. What the tenders must cover.
    pub fn grand_total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Number of lines on the tape.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, mrp_paise: i64, tax_bps: u32) -> ItemSnapshot {
        ItemSnapshot {
            item_id: id.to_string(),
            name: format!("Item {id}"),
            barcode: Some(format!("890{id}")),
            mrp_paise,
            tax_bps,
        }
    }

    fn assert_sum_invariant(cart: &Cart) {
        assert_eq!(cart.grand_total(), cart.subtotal() - cart.total_discount() + cart.total_tax());
        let line_sum: Money = cart.lines.iter().map(|l| l.total).sum();
        assert_eq!(cart.grand_total(), line_sum);
    }

    #[test]
    fn test_add_line_prices_from_snapshot() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].tax.paise(), 600);
        assert_eq!(cart.grand_total().paise(), 12600);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_add_line_never_merges() {
        let mut cart = Cart::new("c1");
        let snap = snapshot("a", 999, 0);
        cart.add_line(&snap, Quantity::from_units(1)).unwrap();
        cart.add_line(&snap, Quantity::from_units(1)).unwrap();

        // Two scans, two tape lines
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.subtotal().paise(), 1998);
    }

    #[test]
    fn test_add_line_rejects_non_positive_quantity() {
        let mut cart = Cart::new("c1");
        let err = cart.add_line(&snapshot("a", 999, 0), Quantity::zero()).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_add_line_rejects_overflowing_quantity() {
        // A quantity large enough to overflow the line base must bounce at
        // the pricer instead of landing as a wrapped negative line.
        let mut cart = Cart::new("c1");
        let err = cart
            .add_line(&snapshot("a", 12000, 500), Quantity::from_milli(i64::MAX))
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.grand_total(), Money::zero());
    }

    #[test]
    fn test_update_line_reprices_with_existing_rate() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        cart.update_line(
            0,
            LinePatch { quantity: Some(Quantity::from_units(2)), ..Default::default() },
        )
        .unwrap();

        assert_eq!(cart.lines[0].base.paise(), 24000);
        assert_eq!(cart.lines[0].tax.paise(), 1200);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_update_line_zero_quantity_deletes() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        cart.update_line(
            0,
            LinePatch { quantity: Some(Quantity::zero()), ..Default::default() },
        )
        .unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.grand_total(), Money::zero());
    }

    #[test]
    fn test_update_line_price_override() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        cart.update_line(
            0,
            LinePatch { unit_price: Some(Money::from_paise(10000)), ..Default::default() },
        )
        .unwrap();

        assert_eq!(cart.lines[0].base.paise(), 10000);
        assert_eq!(cart.lines[0].tax.paise(), 500);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_update_line_rejects_negative_price_and_discount() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        let err = cart
            .update_line(
                0,
                LinePatch { unit_price: Some(Money::from_paise(-1)), ..Default::default() },
            )
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice { .. }));

        let err = cart
            .update_line(
                0,
                LinePatch { discount: Some(Money::from_paise(-1)), ..Default::default() },
            )
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidDiscount { .. }));
    }

    #[test]
    fn test_update_line_overflow_leaves_line_unchanged() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        let err = cart
            .update_line(
                0,
                LinePatch {
                    quantity: Some(Quantity::from_milli(i64::MAX)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));

        // Rejected patch: the line keeps its prior quantity and totals.
        assert_eq!(cart.lines[0].quantity, Quantity::from_units(1));
        assert_eq!(cart.grand_total().paise(), 12600);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_update_line_out_of_range() {
        let mut cart = Cart::new("c1");
        let err = cart.update_line(0, LinePatch::default()).unwrap_err();
        assert_eq!(err, CartError::LineNotFound { index: 0 });
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 100, 0), Quantity::from_units(1)).unwrap();
        cart.add_line(&snapshot("b", 200, 0), Quantity::from_units(1)).unwrap();

        cart.remove_line(0).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].item_id, "b");

        let err = cart.remove_line(5).unwrap_err();
        assert_eq!(err, CartError::LineNotFound { index: 5 });
    }

    #[test]
    fn test_cart_discount_reference_scenario() {
        // ₹120.00 × 1 at 5%, then 10% cart discount:
        // discount ₹12.00, tax ₹5.40, total ₹113.40
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();

        cart.apply_cart_discount(1000).unwrap();

        assert_eq!(cart.total_discount().paise(), 1200);
        assert_eq!(cart.total_tax().paise(), 540);
        assert_eq!(cart.grand_total().paise(), 11340);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_cart_discount_is_idempotent() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 12000, 500), Quantity::from_units(1)).unwrap();
        cart.add_line(&snapshot("b", 4550, 1800), Quantity::from_milli(1500)).unwrap();

        cart.apply_cart_discount(1000).unwrap();
        let once = cart.grand_total();

        cart.apply_cart_discount(1000).unwrap();
        assert_eq!(cart.grand_total(), once);
        assert_sum_invariant(&cart);
    }

    #[test]
    fn test_cart_discount_overwrites_manual_discounts() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 10000, 0), Quantity::from_units(1)).unwrap();
        cart.update_line(
            0,
            LinePatch { discount: Some(Money::from_paise(2500)), ..Default::default() },
        )
        .unwrap();
        assert_eq!(cart.total_discount().paise(), 2500);

        cart.apply_cart_discount(1000).unwrap();
        assert_eq!(cart.total_discount().paise(), 1000);
    }

    #[test]
    fn test_cart_discount_rejects_out_of_range() {
        let mut cart = Cart::new("c1");
        let err = cart.apply_cart_discount(10_001).unwrap_err();
        assert!(matches!(err, CartError::InvalidDiscount { .. }));
    }

    #[test]
    fn test_mutations_require_open_state() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 100, 0), Quantity::from_units(1)).unwrap();
        cart.begin_settlement().unwrap();
        cart.complete_settlement();

        let snap = snapshot("b", 200, 0);
        assert_eq!(cart.add_line(&snap, Quantity::from_units(1)), Err(CartError::NotOpen));
        assert_eq!(cart.update_line(0, LinePatch::default()), Err(CartError::NotOpen));
        assert_eq!(cart.remove_line(0), Err(CartError::NotOpen));
        assert_eq!(cart.apply_cart_discount(0), Err(CartError::NotOpen));
    }

    #[test]
    fn test_settlement_abort_restores_open() {
        let mut cart = Cart::new("c1");
        cart.add_line(&snapshot("a", 100, 0), Quantity::from_units(1)).unwrap();
        cart.begin_settlement().unwrap();
        assert_eq!(cart.begin_settlement(), Err(CartError::NotOpen));

        cart.abort_settlement();
        assert_eq!(cart.state, CartState::Open);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_discard() {
        let mut cart = Cart::new("c1");
        cart.discard().unwrap();
        assert_eq!(cart.state, CartState::Discarded);
        assert_eq!(cart.discard(), Err(CartError::NotOpen));
    }
}
