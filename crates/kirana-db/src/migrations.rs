//! # Embedded Migrations
//!
//! The schema ships inside the binary: `sqlx::migrate!` embeds every SQL
//! file from `migrations/sqlite/` at compile time, and they run in
//! filename order on startup.
//!
//! Adding a migration means adding a new `NNN_description.sql` file with
//! the next sequence number. Applied migrations are never edited; the
//! checksum recorded in `_sqlx_migrations` would reject the change.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded in `_sqlx_migrations`.
/// Idempotent; each migration runs in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(
        migrations = MIGRATOR.migrations.len(),
        "Schema migrations up to date"
    );
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics and tests.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
