//! # Repository Module
//!
//! Database repository implementations for Kirana Checkout.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The Repository pattern isolates all SQL behind a typed API.           │
//! │                                                                         │
//! │  Checkout service                                                       │
//! │       │  db.catalog().snapshot_by_barcode("8901234")                   │
//! │       │  db.receipts().settle(&draft)                                  │
//! │       ▼                                                                 │
//! │  CatalogRepository / ReceiptRepository / StockRepository               │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Item and tax-rate lookup/seeding
//! - [`receipt::ReceiptRepository`] - The settlement transaction and receipt reads
//! - [`stock::StockRepository`] - Stock ledger postings and on-hand view

pub mod catalog;
pub mod receipt;
pub mod stock;
