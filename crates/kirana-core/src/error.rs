//! # Error Types
//!
//! Domain-specific error types for kirana-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kirana-core errors (this file)                                        │
//! │  └── CartError        - Raised by the pure cart and tender ledger      │
//! │                                                                         │
//! │  kirana-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  kirana-checkout errors (service crate)                                │
//! │  └── CheckoutError    - The full caller-facing catalogue               │
//! │                                                                         │
//! │  Flow: CartError → CheckoutError (with cart id attached)               │
//! │        DbError   → CheckoutError::SettlementPersistenceFailed          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (index, amount, etc.)
//! 3. Errors are enum variants, never String
//! 4. The core never repairs an invalid request; it rejects with a named
//!    kind (a quantity-zero update deleting the line is defined behavior,
//!    not error recovery)

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors raised by the pure cart aggregate and tender ledger.
///
/// These carry no cart id; the service layer attaches it when lifting
/// them into the caller-facing catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart has been settled or discarded; no further mutation.
    #[error("cart is not open")]
    NotOpen,

    /// Index-addressed line operation hit a missing index.
    #[error("no line at index {index}")]
    LineNotFound { index: usize },

    /// A quantity that must be positive was not.
    #[error("invalid quantity: {reason}")]
    InvalidQuantity { reason: String },

    /// A unit price below zero.
    #[error("invalid unit price: {reason}")]
    InvalidPrice { reason: String },

    /// A discount outside its allowed range.
    ///
    /// Note the asymmetry: a discount EXCEEDING the line base is clamped
    /// by the line pricer, but a negative discount or an out-of-range
    /// cart percentage is rejected.
    #[error("invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// A tender with a non-positive amount or unrecognized method code.
    #[error("invalid tender: {reason}")]
    InvalidTender { reason: String },
}

impl CartError {
    pub(crate) fn invalid_quantity(reason: impl Into<String>) -> Self {
        CartError::InvalidQuantity { reason: reason.into() }
    }

    pub(crate) fn invalid_price(reason: impl Into<String>) -> Self {
        CartError::InvalidPrice { reason: reason.into() }
    }

    pub(crate) fn invalid_discount(reason: impl Into<String>) -> Self {
        CartError::InvalidDiscount { reason: reason.into() }
    }

    pub(crate) fn invalid_tender(reason: impl Into<String>) -> Self {
        CartError::InvalidTender { reason: reason.into() }
    }
}

/// Convenience type alias for Results with CartError.
pub type CoreResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
