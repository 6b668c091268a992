//! # Checkout Service
//!
//! The operational surface of the engine: one method per till action,
//! from opening a cart through settlement. The service owns the cart
//! registry and the database handle; callers see only cart ids, views,
//! and the error catalogue.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settle(cart_id)                                                        │
//! │                                                                         │
//! │  lock cart ──► Open? ──► validate ──► begin_settlement                 │
//! │                  │no         │fail         │                            │
//! │                  ▼           ▼             ▼                            │
//! │            CartNotOpen   error, cart   build draft ──► db settle txn   │
//! │                          stays Open         │              │            │
//! │                                        Ok ──┤              │ Err        │
//! │                                             ▼              ▼            │
//! │                                  complete_settlement  abort_settlement  │
//! │                                  dispose from registry  cart back Open  │
//! │                                  return SettledReceipt  persistence err │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The per-cart lock is held across the entire flow, including the
//! database transaction. A concurrent `settle` on the same cart waits on
//! the lock and then finds the cart settled or gone; exactly one caller
//! ever wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use kirana_core::{CartState, LinePatch, Money, Quantity, TenderMethod};
use kirana_db::{Database, SettledReceipt};

use crate::error::{CheckoutError, CheckoutResult};
use crate::registry::{CartRegistry, CheckoutCart};
use crate::settlement;

// =============================================================================
// Item Reference
// =============================================================================

/// How a till identifies an item: direct id, or a scanned barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "by", content = "value")]
pub enum ItemRef {
    Id(String),
    Barcode(String),
}

impl ItemRef {
    fn key(&self) -> &str {
        match self {
            ItemRef::Id(id) => id,
            ItemRef::Barcode(code) => code,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// Read-only projection of a cart for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: String,
    pub state: CartState,
    pub lines: Vec<LineView>,
    pub tenders: Vec<TenderView>,
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub grand_total_paise: i64,
    pub paid_paise: i64,
    pub due_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub item_id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub quantity_milli: i64,
    pub unit_price_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub total_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderView {
    pub method: TenderMethod,
    pub amount_paise: i64,
    pub reference: Option<String>,
}

fn view_of(checkout: &CheckoutCart) -> CartView {
    let cart = &checkout.cart;
    let tenders = &checkout.tenders;
    let grand_total = cart.grand_total();

    CartView {
        cart_id: cart.id.clone(),
        state: cart.state,
        lines: cart
            .lines
            .iter()
            .map(|line| LineView {
                item_id: line.item_id.clone(),
                name: line.name.clone(),
                barcode: line.barcode.clone(),
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
            .map(|tender| TenderView {
                method: tender.method,
                amount_paise: tender.amount.paise(),
                reference: tender.reference.clone(),
            })
            .collect(),
        subtotal_paise: cart.subtotal().paise(),
        discount_paise: cart.total_discount().paise(),
        tax_paise: cart.total_tax().paise(),
        grand_total_paise: grand_total.paise(),
        paid_paise: tenders.paid().paise(),
        due_paise: tenders.due(grand_total).paise(),
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The checkout engine's public surface. Cheap to clone; clones share
/// the registry and the connection pool.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    registry: Arc<CartRegistry>,
    db: Database,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        CheckoutService {
            registry: Arc::new(CartRegistry::new()),
            db,
        }
    }

    /// Number of carts currently live (open or mid-settlement).
    pub fn live_carts(&self) -> usize {
        self.registry.len()
    }

    async fn cart(&self, cart_id: &str) -> CheckoutResult<Arc<tokio::sync::Mutex<CheckoutCart>>> {
        self.registry
            .get(cart_id)
            .ok_or_else(|| CheckoutError::CartNotFound(cart_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Cart lifecycle
    // -------------------------------------------------------------------------

    /// Opens a new empty cart and returns its id.
    pub fn start_cart(&self) -> String {
        let cart_id = Uuid::new_v4().to_string();
        self.registry.create(&cart_id);
        info!(cart_id = %cart_id, "Cart opened");
        cart_id
    }

    /// Discards an open cart without settling. Tenders recorded against
    /// it are dropped; nothing is persisted.
    pub async fn abandon(&self, cart_id: &str) -> CheckoutResult<()> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        checkout
            .cart
            .discard()
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;
        drop(checkout);

        self.registry.dispose(cart_id);
        info!(cart_id = %cart_id, "Cart abandoned");
        Ok(())
    }

    /// Read-only snapshot of a live cart.
    pub async fn cart_view(&self, cart_id: &str) -> CheckoutResult<CartView> {
        let handle = self.cart(cart_id).await?;
        let checkout = handle.lock().await;
        Ok(view_of(&checkout))
    }

    // -------------------------------------------------------------------------
    // Line operations
    // -------------------------------------------------------------------------

    /// Adds a line for the referenced item, snapshotting name and MRP
    /// from the catalog at this moment. Each call appends a new line.
    pub async fn add_line(
        &self,
        cart_id: &str,
        item: ItemRef,
        quantity_milli: i64,
    ) -> CheckoutResult<CartView> {
        let snapshot = match &item {
            ItemRef::Id(id) => self.db.catalog().snapshot_by_id(id).await,
            ItemRef::Barcode(code) => self.db.catalog().snapshot_by_barcode(code).await,
        }
        .map_err(|e| CheckoutError::Storage(e.to_string()))?
        .ok_or_else(|| CheckoutError::ItemNotFound(item.key().to_string()))?;

        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        checkout
            .cart
            .add_line(&snapshot, Quantity::from_milli(quantity_milli))
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(
            cart_id = %cart_id,
            item_id = %snapshot.item_id,
            quantity_milli,
            "Line added"
        );
        Ok(view_of(&checkout))
    }

    /// Patches the line at `index`; a patched quantity ≤ 0 removes it.
    pub async fn update_line(
        &self,
        cart_id: &str,
        index: usize,
        patch: LinePatch,
    ) -> CheckoutResult<CartView> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        checkout
            .cart
            .update_line(index, patch)
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(cart_id = %cart_id, index, "Line updated");
        Ok(view_of(&checkout))
    }

    /// Voids the line at `index`.
    pub async fn remove_line(&self, cart_id: &str, index: usize) -> CheckoutResult<CartView> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        checkout
            .cart
            .remove_line(index)
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(cart_id = %cart_id, index, "Line removed");
        Ok(view_of(&checkout))
    }

    /// Applies a whole-cart percentage discount (basis points, 0..=10000).
    /// Overwrites any per-line discounts; applying twice is idempotent.
    pub async fn apply_discount(&self, cart_id: &str, percent_bps: u32) -> CheckoutResult<CartView> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        checkout
            .cart
            .apply_cart_discount(percent_bps)
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(cart_id = %cart_id, percent_bps, "Cart discount applied");
        Ok(view_of(&checkout))
    }

    // -------------------------------------------------------------------------
    // Tender operations
    // -------------------------------------------------------------------------

    /// Records a payment against the cart. The method code comes from
    /// the closed set (`CASH`, `CARD`, `UPI`, `WALLET`, `GIFT_CARD`,
    /// `STORE_CREDIT`, case-insensitive); anything else is rejected.
    pub async fn add_tender(
        &self,
        cart_id: &str,
        method_code: &str,
        amount_paise: i64,
        reference: Option<String>,
    ) -> CheckoutResult<CartView> {
        let method = TenderMethod::parse(method_code).ok_or_else(|| {
            CheckoutError::InvalidTender(format!("unknown tender method: {method_code}"))
        })?;

        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        if checkout.cart.state != CartState::Open {
            return Err(CheckoutError::CartNotOpen(cart_id.to_string()));
        }
        checkout
            .tenders
            .add(method, Money::from_paise(amount_paise), reference)
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(cart_id = %cart_id, method = method.code(), amount_paise, "Tender recorded");
        Ok(view_of(&checkout))
    }

    /// Removes a mis-entered tender by index.
    pub async fn remove_tender(&self, cart_id: &str, index: usize) -> CheckoutResult<CartView> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        if checkout.cart.state != CartState::Open {
            return Err(CheckoutError::CartNotOpen(cart_id.to_string()));
        }
        checkout
            .tenders
            .remove(index)
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        debug!(cart_id = %cart_id, index, "Tender removed");
        Ok(view_of(&checkout))
    }

    // -------------------------------------------------------------------------
    // Settlement
    // -------------------------------------------------------------------------

    /// Settles the cart: validates, freezes totals, persists the receipt
    /// atomically, and removes the cart from the registry.
    ///
    /// On any failure the cart stays open with lines and tenders intact,
    /// so the caller can correct (add payment, remove a line) and retry.
    pub async fn settle(&self, cart_id: &str) -> CheckoutResult<SettledReceipt> {
        let handle = self.cart(cart_id).await?;
        let mut checkout = handle.lock().await;

        if checkout.cart.state != CartState::Open {
            return Err(CheckoutError::CartNotOpen(cart_id.to_string()));
        }
        settlement::validate(&checkout.cart, &checkout.tenders)?;

        checkout
            .cart
            .begin_settlement()
            .map_err(|e| CheckoutError::from_cart(e, cart_id))?;

        let draft = settlement::build_draft(&checkout.cart, &checkout.tenders);

        match self.db.receipts().settle(&draft).await {
            Ok(settled) => {
                checkout.cart.complete_settlement();
                drop(checkout);
                self.registry.dispose(cart_id);

                info!(
                    cart_id = %cart_id,
                    receipt_number = %settled.receipt.receipt_number,
                    grand_total_paise = settled.receipt.grand_total_paise,
                    "Cart settled"
                );
                Ok(settled)
            }
            Err(e) => {
                // Nothing was persisted; reopen so the caller can retry.
                checkout.cart.abort_settlement();
                warn!(cart_id = %cart_id, error = %e, "Settlement persistence failed");
                Err(CheckoutError::SettlementPersistenceFailed(e.to_string()))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Receipt read path
    // -------------------------------------------------------------------------

    /// Fetches a settled receipt by its human-readable number, with its
    /// lines and tenders.
    pub async fn receipt_by_number(&self, number: &str) -> CheckoutResult<Option<SettledReceipt>> {
        let receipts = self.db.receipts();
        let storage = |e: kirana_db::DbError| CheckoutError::Storage(e.to_string());

        let Some(receipt) = receipts.receipt_by_number(number).await.map_err(storage)? else {
            return Ok(None);
        };
        let lines = receipts.lines_for(&receipt.id).await.map_err(storage)?;
        let tenders = receipts.tenders_for(&receipt.id).await.map_err(storage)?;

        Ok(Some(SettledReceipt {
            receipt,
            lines,
            tenders,
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
