//! # Receipt Repository
//!
//! The settlement transaction and receipt read paths.
//!
//! ## The Settlement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 settle(draft) - ONE SQLite transaction                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. Bump the per-day receipt counter ──► allocate RCP-YYYYMMDD-NNNN  │
//! │    2. INSERT receipts row                                              │
//! │    3. INSERT receipt_lines (one per cart line, tape order)             │
//! │    4. INSERT receipt_tenders (one per tender, status SUCCESS)          │
//! │    5. INSERT stock_ledger (one per line, quantity NEGATED)             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure between BEGIN and COMMIT rolls the whole thing back:      │
//! │  no receipt without its full line/tender/stock set, no stock entry     │
//! │  without a receipt. The caller's cart stays open and intact.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter bump runs inside the transaction, so two concurrent
//! settlements serialize on the row and can never observe the same
//! sequence value. The UNIQUE constraint on `receipt_number` is the
//! backstop.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kirana_core::{Receipt, ReceiptLine, ReceiptTender, TenderMethod, TenderStatus};

// =============================================================================
// Settlement Draft
// =============================================================================

/// Everything the settlement engine has decided, ready to persist.
///
/// The draft carries no receipt number; that is allocated inside the
/// transaction. All totals are pre-computed by the engine so the
/// persistence layer does no arithmetic.
#[derive(Debug, Clone)]
pub struct SettlementDraft {
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub igst_paise: i64,
    pub grand_total_paise: i64,
    pub paid_paise: i64,
    pub change_paise: i64,
    pub lines: Vec<DraftLine>,
    pub tenders: Vec<DraftTender>,
}

/// One cart line, snapshotted for the receipt.
#[derive(Debug, Clone)]
pub struct DraftLine {
    pub item_id: String,
    pub name: String,
    pub quantity_milli: i64,
    pub unit_price_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub total_paise: i64,
}

/// One tender, snapshotted for the receipt.
#[derive(Debug, Clone)]
pub struct DraftTender {
    pub method: TenderMethod,
    pub amount_paise: i64,
    pub reference: Option<String>,
}

/// The persisted result of a successful settlement.
#[derive(Debug, Clone)]
pub struct SettledReceipt {
    pub receipt: Receipt,
    pub lines: Vec<ReceiptLine>,
    pub tenders: Vec<ReceiptTender>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Persists a settlement draft atomically and returns the full receipt.
    ///
    /// All-or-nothing: if any insert fails, the transaction rolls back on
    /// drop and the database is untouched.
    pub async fn settle(&self, draft: &SettlementDraft) -> DbResult<SettledReceipt> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let now = Utc::now();
        let day = now.format("%Y%m%d").to_string();

        // Atomic allocation: the counter row is bumped under the
        // transaction's write lock.
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO receipt_counters (day, next_seq)
            VALUES (?1, 1)
            ON CONFLICT(day) DO UPDATE SET next_seq = next_seq + 1
            RETURNING next_seq
            "#,
        )
        .bind(&day)
        .fetch_one(&mut *tx)
        .await?;

        let receipt_number = format!("RCP-{day}-{seq:04}");
        let receipt_id = Uuid::new_v4().to_string();

        debug!(receipt_number = %receipt_number, "Allocated receipt number");

        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, receipt_number,
                subtotal_paise, discount_paise, tax_paise,
                cgst_paise, sgst_paise, igst_paise,
                grand_total_paise, paid_paise, change_paise,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&receipt_id)
        .bind(&receipt_number)
        .bind(draft.subtotal_paise)
        .bind(draft.discount_paise)
        .bind(draft.tax_paise)
        .bind(draft.cgst_paise)
        .bind(draft.sgst_paise)
        .bind(draft.igst_paise)
        .bind(draft.grand_total_paise)
        .bind(draft.paid_paise)
        .bind(draft.change_paise)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for (line_no, line) in draft.lines.iter().enumerate() {
            let persisted = ReceiptLine {
                id: Uuid::new_v4().to_string(),
                receipt_id: receipt_id.clone(),
                item_id: line.item_id.clone(),
                name_snapshot: line.name.clone(),
                quantity_milli: line.quantity_milli,
                unit_price_paise: line.unit_price_paise,
                discount_paise: line.discount_paise,
                tax_paise: line.tax_paise,
                total_paise: line.total_paise,
                line_no: line_no as i64,
            };

            sqlx::query(
                r#"
                INSERT INTO receipt_lines (
                    id, receipt_id, item_id, name_snapshot,
                    quantity_milli, unit_price_paise, discount_paise,
                    tax_paise, total_paise, line_no
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&persisted.id)
            .bind(&persisted.receipt_id)
            .bind(&persisted.item_id)
            .bind(&persisted.name_snapshot)
            .bind(persisted.quantity_milli)
            .bind(persisted.unit_price_paise)
            .bind(persisted.discount_paise)
            .bind(persisted.tax_paise)
            .bind(persisted.total_paise)
            .bind(persisted.line_no)
            .execute(&mut *tx)
            .await?;

            lines.push(persisted);
        }

        let mut tenders = Vec::with_capacity(draft.tenders.len());
        for tender in &draft.tenders {
            let persisted = ReceiptTender {
                id: Uuid::new_v4().to_string(),
                receipt_id: receipt_id.clone(),
                method: tender.method,
                amount_paise: tender.amount_paise,
                reference: tender.reference.clone(),
                status: TenderStatus::Success,
            };

            sqlx::query(
                r#"
                INSERT INTO receipt_tenders (
                    id, receipt_id, method, amount_paise, reference, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&persisted.id)
            .bind(&persisted.receipt_id)
            .bind(persisted.method)
            .bind(persisted.amount_paise)
            .bind(&persisted.reference)
            .bind(persisted.status)
            .execute(&mut *tx)
            .await?;

            tenders.push(persisted);
        }

        // Stock postings: a sale reduces stock, so quantities are negated.
        for line in &draft.lines {
            sqlx::query(
                r#"
                INSERT INTO stock_ledger (id, item_id, delta_milli, reference, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&line.item_id)
            .bind(-line.quantity_milli)
            .bind(&receipt_number)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            receipt_number = %receipt_number,
            lines = lines.len(),
            tenders = tenders.len(),
            grand_total_paise = draft.grand_total_paise,
            "Receipt persisted"
        );

        Ok(SettledReceipt {
            receipt: Receipt {
                id: receipt_id,
                receipt_number,
                subtotal_paise: draft.subtotal_paise,
                discount_paise: draft.discount_paise,
                tax_paise: draft.tax_paise,
                cgst_paise: draft.cgst_paise,
                sgst_paise: draft.sgst_paise,
                igst_paise: draft.igst_paise,
                grand_total_paise: draft.grand_total_paise,
                paid_paise: draft.paid_paise,
                change_paise: draft.change_paise,
                created_at: now,
            },
            lines,
            tenders,
        })
    }

    // -------------------------------------------------------------------------
    // Read paths (for the external rendering/reporting collaborators)
    // -------------------------------------------------------------------------

    /// Gets a receipt by its human-readable number.
    pub async fn receipt_by_number(&self, number: &str) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, receipt_number,
                   subtotal_paise, discount_paise, tax_paise,
                   cgst_paise, sgst_paise, igst_paise,
                   grand_total_paise, paid_paise, change_paise,
                   created_at
            FROM receipts
            WHERE receipt_number = ?1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    /// Gets all lines for a receipt, in tape order.
    pub async fn lines_for(&self, receipt_id: &str) -> DbResult<Vec<ReceiptLine>> {
        let lines = sqlx::query_as::<_, ReceiptLine>(
            r#"
            SELECT id, receipt_id, item_id, name_snapshot,
                   quantity_milli, unit_price_paise, discount_paise,
                   tax_paise, total_paise, line_no
            FROM receipt_lines
            WHERE receipt_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets all tenders for a receipt.
    pub async fn tenders_for(&self, receipt_id: &str) -> DbResult<Vec<ReceiptTender>> {
        let tenders = sqlx::query_as::<_, ReceiptTender>(
            r#"
            SELECT id, receipt_id, method, amount_paise, reference, status
            FROM receipt_tenders
            WHERE receipt_id = ?1
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenders)
    }

    /// Counts persisted receipts. Diagnostics and tests.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kirana_core::Item;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_item(db: &Database, name: &str) -> String {
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            barcode: None,
            name: name.to_string(),
            mrp_paise: 12000,
            tax_rate_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.catalog().insert_item(&item).await.unwrap();
        item.id
    }

    fn draft_for(item_id: &str) -> SettlementDraft {
        SettlementDraft {
            subtotal_paise: 12000,
            discount_paise: 1200,
            tax_paise: 540,
            cgst_paise: 270,
            sgst_paise: 270,
            igst_paise: 0,
            grand_total_paise: 11340,
            paid_paise: 11340,
            change_paise: 0,
            lines: vec![DraftLine {
                item_id: item_id.to_string(),
                name: "Atta 5kg".to_string(),
                quantity_milli: 1000,
                unit_price_paise: 12000,
                discount_paise: 1200,
                tax_paise: 540,
                total_paise: 11340,
            }],
            tenders: vec![
                DraftTender {
                    method: TenderMethod::Upi,
                    amount_paise: 5670,
                    reference: Some("upi-txn-42".to_string()),
                },
                DraftTender {
                    method: TenderMethod::Cash,
                    amount_paise: 5670,
                    reference: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_settle_persists_full_receipt_set() {
        let db = test_db().await;
        let item_id = seed_item(&db, "Atta 5kg").await;

        let settled = db.receipts().settle(&draft_for(&item_id)).await.unwrap();

        assert!(settled.receipt.receipt_number.starts_with("RCP-"));
        assert!(settled.receipt.receipt_number.ends_with("-0001"));
        assert_eq!(settled.lines.len(), 1);
        assert_eq!(settled.tenders.len(), 2);
        assert_eq!(settled.tenders[0].status, TenderStatus::Success);

        // Read back through the public paths
        let receipt = db
            .receipts()
            .receipt_by_number(&settled.receipt.receipt_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(receipt.grand_total_paise, 11340);
        assert_eq!(receipt.cgst_paise + receipt.sgst_paise, receipt.tax_paise);
        assert_eq!(receipt.igst_paise, 0);

        let lines = db.receipts().lines_for(&receipt.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total_paise, 11340);

        // Stock posted with negated quantity
        let entries = db
            .stock()
            .entries_for_reference(&receipt.receipt_number)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].delta_milli, -1000);
        assert_eq!(entries[0].item_id, item_id);
    }

    #[tokio::test]
    async fn test_receipt_numbers_are_sequential_and_unique() {
        let db = test_db().await;
        let item_id = seed_item(&db, "Atta 5kg").await;

        let first = db.receipts().settle(&draft_for(&item_id)).await.unwrap();
        let second = db.receipts().settle(&draft_for(&item_id)).await.unwrap();

        assert_ne!(first.receipt.receipt_number, second.receipt.receipt_number);
        assert!(first.receipt.receipt_number.ends_with("-0001"));
        assert!(second.receipt.receipt_number.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_failed_settlement_rolls_back_everything() {
        let db = test_db().await;

        // Line references a nonexistent item: the FK check fires after the
        // receipt row is already in the transaction.
        let draft = draft_for("no-such-item");
        let err = db.receipts().settle(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // Nothing may survive the rollback
        assert_eq!(db.receipts().count().await.unwrap(), 0);
        let stock_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_ledger")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stock_rows, 0);

        // And the counter allocation must not leak a used number: the next
        // successful settlement still gets a fresh, unique number.
        let item_id = seed_item(&db, "Atta 5kg").await;
        let settled = db.receipts().settle(&draft_for(&item_id)).await.unwrap();
        assert_eq!(db.receipts().count().await.unwrap(), 1);
        assert!(settled.receipt.receipt_number.starts_with("RCP-"));
    }

    #[tokio::test]
    async fn test_missing_receipt_is_none() {
        let db = test_db().await;
        assert!(db
            .receipts()
            .receipt_by_number("RCP-19700101-0001")
            .await
            .unwrap()
            .is_none());
    }
}
