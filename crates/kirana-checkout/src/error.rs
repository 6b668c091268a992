//! # Checkout Error Catalogue
//!
//! The caller-facing error kinds of the checkout engine. Every kind is a
//! recoverable, caller-visible condition with a stable code, so a
//! transport layer can decide whether to prompt for correction
//! (`InsufficientPayment`) or treat the request as a bug (`LineNotFound`).
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kirana-core::CartError ──(cart id attached)──► CheckoutError          │
//! │                                                                         │
//! │  kirana-db::DbError ──┬─(catalog lookup)──► Storage                    │
//! │                       └─(settlement txn)──► SettlementPersistenceFailed│
//! │                                                                         │
//! │  SettlementPersistenceFailed is terminal for that settle() call: the   │
//! │  receipt was NOT created and funds must not be considered captured.    │
//! │  Retrying is the caller's decision; the engine never retries a        │
//! │  payment-bearing operation on its own.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use kirana_core::CartError;

// =============================================================================
// Checkout Error
// =============================================================================

/// Everything a checkout operation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No cart registered under this id.
    #[error("cart not found: {0}")]
    CartNotFound(String),

    /// The cart exists but has been settled or discarded.
    #[error("cart {0} is not open")]
    CartNotOpen(String),

    /// Item lookup by id or barcode found nothing sellable.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Index-addressed line operation hit a missing index.
    #[error("no line at index {index}")]
    LineNotFound { index: usize },

    /// A quantity that must be positive was not.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A unit price below zero.
    #[error("invalid unit price: {0}")]
    InvalidPrice(String),

    /// A discount percentage outside [0, 100] or a negative amount.
    #[error("invalid discount: {0}")]
    InvalidDiscount(String),

    /// A tender with a non-positive amount, a bad index, or a method code
    /// outside the recognized set (the set is closed; nothing is
    /// auto-created for unknown codes).
    #[error("invalid tender: {0}")]
    InvalidTender(String),

    /// Settlement attempted on a cart with no lines.
    #[error("cart {0} has no lines")]
    EmptyCart(String),

    /// Settlement attempted with no tenders recorded.
    #[error("no payment recorded for cart {0}")]
    NoPayment(String),

    /// Tenders do not cover the grand total. Reports exactly what is
    /// still owed, to the paisa.
    #[error("insufficient payment: {due_paise} paise still due")]
    InsufficientPayment { due_paise: i64 },

    /// The settlement transaction failed and was rolled back. No receipt
    /// exists; the cart is still open and intact.
    #[error("settlement persistence failed: {0}")]
    SettlementPersistenceFailed(String),

    /// A non-settlement persistence failure (catalog lookup, read path).
    #[error("storage error: {0}")]
    Storage(String),
}

impl CheckoutError {
    /// Stable machine-readable code for transports to map on.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::CartNotFound(_) => "CART_NOT_FOUND",
            CheckoutError::CartNotOpen(_) => "CART_NOT_OPEN",
            CheckoutError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            CheckoutError::LineNotFound { .. } => "LINE_NOT_FOUND",
            CheckoutError::InvalidQuantity(_) => "INVALID_QUANTITY",
            CheckoutError::InvalidPrice(_) => "INVALID_PRICE",
            CheckoutError::InvalidDiscount(_) => "INVALID_DISCOUNT",
            CheckoutError::InvalidTender(_) => "INVALID_TENDER",
            CheckoutError::EmptyCart(_) => "EMPTY_CART",
            CheckoutError::NoPayment(_) => "NO_PAYMENT",
            CheckoutError::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            CheckoutError::SettlementPersistenceFailed(_) => "SETTLEMENT_PERSISTENCE_FAILED",
            CheckoutError::Storage(_) => "STORAGE",
        }
    }

    /// Lifts a core cart error, attaching the cart id where the core
    /// variant has none.
    pub(crate) fn from_cart(err: CartError, cart_id: &str) -> Self {
        match err {
            CartError::NotOpen => CheckoutError::CartNotOpen(cart_id.to_string()),
            CartError::LineNotFound { index } => CheckoutError::LineNotFound { index },
            CartError::InvalidQuantity { reason } => CheckoutError::InvalidQuantity(reason),
            CartError::InvalidPrice { reason } => CheckoutError::InvalidPrice(reason),
            CartError::InvalidDiscount { reason } => CheckoutError::InvalidDiscount(reason),
            CartError::InvalidTender { reason } => CheckoutError::InvalidTender(reason),
        }
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CheckoutError::CartNotFound("c".into()),
            CheckoutError::CartNotOpen("c".into()),
            CheckoutError::ItemNotFound("i".into()),
            CheckoutError::LineNotFound { index: 0 },
            CheckoutError::InvalidQuantity("q".into()),
            CheckoutError::InvalidPrice("p".into()),
            CheckoutError::InvalidDiscount("d".into()),
            CheckoutError::InvalidTender("t".into()),
            CheckoutError::EmptyCart("c".into()),
            CheckoutError::NoPayment("c".into()),
            CheckoutError::InsufficientPayment { due_paise: 1 },
            CheckoutError::SettlementPersistenceFailed("x".into()),
            CheckoutError::Storage("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_from_cart_attaches_cart_id() {
        let err = CheckoutError::from_cart(CartError::NotOpen, "cart-7");
        assert_eq!(err, CheckoutError::CartNotOpen("cart-7".to_string()));

        let err = CheckoutError::from_cart(CartError::LineNotFound { index: 3 }, "cart-7");
        assert_eq!(err, CheckoutError::LineNotFound { index: 3 });
    }

    #[test]
    fn test_insufficient_payment_reports_due() {
        let err = CheckoutError::InsufficientPayment { due_paise: 1340 };
        assert_eq!(err.to_string(), "insufficient payment: 1340 paise still due");
    }
}
