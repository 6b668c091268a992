//! # kirana-db: Database Layer for Kirana Checkout
//!
//! This crate provides database access for the checkout engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Kirana Checkout Data Flow                           │
//! │                                                                         │
//! │  kirana-checkout (service layer)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kirana-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  catalog.rs   │    │  (embedded)  │  │   │
//! │  │   │               │    │  receipt.rs   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  stock.rs     │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FK on   │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The One Transactional Primitive
//!
//! [`repository::receipt::ReceiptRepository::settle`] is the atomic
//! "create receipt + lines + tenders + stock entries" operation the
//! settlement engine depends on. Everything else here is lookups and
//! seeding.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::catalog::CatalogRepository;
pub use repository::receipt::{
    DraftLine, DraftTender, ReceiptRepository, SettledReceipt, SettlementDraft,
};
pub use repository::stock::StockRepository;
