//! # kirana-core: Pure Checkout Logic for Kirana Checkout
//!
//! This crate is the **heart** of the checkout engine. It contains all
//! pricing and cart logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Kirana Checkout Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport / UI (external collaborators)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               kirana-checkout (service layer)                   │   │
//! │  │    cart registry, settlement engine, per-cart locking           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  pricing  │  │   cart    │  │  tender   │  │   │
//! │  │   │   Money   │  │ price_line│  │   Cart    │  │  Ledger   │  │   │
//! │  │   │  Quantity │  │ PricedLine│  │ CartLine  │  │  Tender   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kirana-db (Database Layer)                   │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Receipt, StockLedgerEntry, etc.)
//! - [`money`] - Money type with integer paise arithmetic (no floats!)
//! - [`pricing`] - The line pricer: tax and total for one line
//! - [`cart`] - The cart aggregate: ordered lines + derived totals
//! - [`tender`] - The tender ledger: paid / due / change arithmetic
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::money::Money;
//! use kirana_core::pricing::price_line;
//! use kirana_core::types::Quantity;
//!
//! // ₹120.00 × 1 at 5% GST
//! let priced = price_line(
//!     Money::from_paise(12000),
//!     Quantity::from_units(1),
//!     Money::zero(),
//!     500,
//! ).unwrap();
//! assert_eq!(priced.total.paise(), 12600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod tender;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kirana_core::Money` instead of
// `use kirana_core::money::Money`

pub use cart::{Cart, CartLine, LinePatch};
pub use error::{CartError, CoreResult};
pub use money::Money;
pub use pricing::{price_line, PricedLine};
pub use tender::{Tender, TenderLedger};
pub use types::*;
