//! # Stock Ledger Repository
//!
//! Read paths over the stock ledger plus manual adjustments (goods
//! receiving, stocktake corrections). Sale postings are NOT made here:
//! they happen inside the settlement transaction in the receipt
//! repository, so a sale can never decrement stock without its receipt.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kirana_core::StockLedgerEntry;

/// Repository for stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Posts a manual stock adjustment (positive for receiving goods,
    /// negative for shrinkage). `reference` names the document behind it,
    /// e.g. a GRN number.
    pub async fn post_adjustment(
        &self,
        item_id: &str,
        delta_milli: i64,
        reference: &str,
    ) -> DbResult<StockLedgerEntry> {
        debug!(item_id = %item_id, delta_milli, reference = %reference, "Posting stock adjustment");

        let entry = StockLedgerEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            delta_milli,
            reference: reference.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO stock_ledger (id, item_id, delta_milli, reference, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.item_id)
        .bind(entry.delta_milli)
        .bind(&entry.reference)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// All movements tied to one reference (e.g. a receipt number).
    pub async fn entries_for_reference(&self, reference: &str) -> DbResult<Vec<StockLedgerEntry>> {
        let entries = sqlx::query_as::<_, StockLedgerEntry>(
            r#"
            SELECT id, item_id, delta_milli, reference, created_at
            FROM stock_ledger
            WHERE reference = ?1
            ORDER BY created_at
            "#,
        )
        .bind(reference)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// All movements for one item, newest first.
    pub async fn entries_for_item(&self, item_id: &str) -> DbResult<Vec<StockLedgerEntry>> {
        let entries = sqlx::query_as::<_, StockLedgerEntry>(
            r#"
            SELECT id, item_id, delta_milli, reference, created_at
            FROM stock_ledger
            WHERE item_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Current stock on hand for an item: the sum of all ledger deltas,
    /// in milli-units. An item with no movements is 0.
    pub async fn on_hand_milli(&self, item_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(delta_milli) FROM stock_ledger WHERE item_id = ?1",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
