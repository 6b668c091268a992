//! # Kirana Checkout
//!
//! The checkout transaction engine: carts, tenders, and atomic
//! settlement over the core pricing rules and the SQLite store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       kirana-checkout                           │
//! │                                                                 │
//! │  CheckoutService ──► CartRegistry ──► CheckoutCart              │
//! │        │                                (Cart + TenderLedger)   │
//! │        │                                                        │
//! │        ├──► settlement (validate, build draft, GST split)       │
//! │        │                                                        │
//! │        └──► kirana-db (catalog snapshots, settlement txn)       │
//! │                    └──► kirana-core (money, pricing, cart)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Carts are in-memory only: an abandoned cart or a process restart
//! leaves no trace. The database first hears about a sale inside the
//! settlement transaction, which either fully commits or leaves nothing.

pub mod error;
pub mod registry;
pub mod service;
pub mod settlement;

pub use error::{CheckoutError, CheckoutResult};
pub use registry::{CartRegistry, CheckoutCart};
pub use service::{CartView, CheckoutService, ItemRef, LineView, TenderView};
