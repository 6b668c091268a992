//! # Catalog Repository
//!
//! Item and tax-rate lookup. The checkout core consumes catalog data only
//! through [`ItemSnapshot`]s: the tax-rate reference is resolved to basis
//! points at lookup time, and the snapshot is frozen into the cart line.
//! Catalog edits after that moment never reach an existing line.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kirana_core::{Item, ItemSnapshot, TaxRate};

/// SELECT list for an item snapshot: the effective tax rate is already
/// folded in (rate + cess, 0 when the item has no rate).
const SNAPSHOT_SELECT: &str = r#"
    SELECT
        i.id AS item_id,
        i.name,
        i.barcode,
        i.mrp_paise,
        COALESCE(t.rate_bps + t.cess_bps, 0) AS tax_bps
    FROM items i
    LEFT JOIN tax_rates t ON t.id = i.tax_rate_id
"#;

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Tax rates
    // -------------------------------------------------------------------------

    /// Inserts a tax rate.
    pub async fn insert_tax_rate(&self, rate: &TaxRate) -> DbResult<()> {
        debug!(id = %rate.id, name = %rate.name, "Inserting tax rate");

        sqlx::query(
            r#"
            INSERT INTO tax_rates (id, name, rate_bps, cess_bps)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.name)
        .bind(rate.rate_bps)
        .bind(rate.cess_bps)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a tax rate by id.
    pub async fn tax_rate_by_id(&self, id: &str) -> DbResult<Option<TaxRate>> {
        let rate = sqlx::query_as::<_, TaxRate>(
            "SELECT id, name, rate_bps, cess_bps FROM tax_rates WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rate)
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Inserts a catalog item.
    pub async fn insert_item(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, barcode, name, mrp_paise, tax_rate_id,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.barcode)
        .bind(&item.name)
        .bind(item.mrp_paise)
        .bind(&item.tax_rate_id)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a full item record by id.
    pub async fn item_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, barcode, name, mrp_paise, tax_rate_id,
                   is_active, created_at, updated_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Snapshot of an active item by id, tax rate resolved.
    pub async fn snapshot_by_id(&self, id: &str) -> DbResult<Option<ItemSnapshot>> {
        let sql = format!("{SNAPSHOT_SELECT} WHERE i.id = ?1 AND i.is_active = 1");
        let snapshot = sqlx::query_as::<_, ItemSnapshot>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(snapshot)
    }

    /// Snapshot of an active item by barcode, tax rate resolved.
    pub async fn snapshot_by_barcode(&self, barcode: &str) -> DbResult<Option<ItemSnapshot>> {
        let sql = format!("{SNAPSHOT_SELECT} WHERE i.barcode = ?1 AND i.is_active = 1");
        let snapshot = sqlx::query_as::<_, ItemSnapshot>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(snapshot)
    }

    /// Updates an item's MRP. Existing cart lines keep their snapshotted
    /// price; only future snapshots see the new one.
    pub async fn update_mrp(&self, id: &str, mrp_paise: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET mrp_paise = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(mrp_paise)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Deactivates an item (soft delete). Open cart lines referencing it
    /// are unaffected; it just stops resolving for new lines.
    pub async fn deactivate_item(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
