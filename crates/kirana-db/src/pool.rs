//! # Database Pool
//!
//! SQLite connection pool setup for the checkout engine.
//!
//! The settlement transaction is the one real writer here; the rest of the
//! traffic is catalog snapshots and receipt reads. WAL journal mode keeps
//! those readers from blocking the settlement writer and vice versa.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::receipt::ReceiptRepository;
use crate::repository::stock::StockRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool configuration, built up from a database path.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./data/kirana.db").max_connections(3);
/// let db = Database::new(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool cap. A single till never needs many; 5 leaves headroom for
    /// reporting reads alongside a settlement.
    pub max_connections: u32,

    /// Connections kept warm.
    pub min_connections: u32,

    /// How long to wait for a free connection before giving up.
    pub acquire_timeout: Duration,

    /// Idle time before a pooled connection is dropped.
    pub idle_timeout: Duration,

    /// Apply pending migrations during `Database::new`.
    pub auto_migrate: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            auto_migrate: true,
        }
    }

    /// A throwaway in-memory database for tests. Single connection:
    /// every pooled connection would otherwise get its own empty
    /// in-memory database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            auto_migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = if self.database_path.as_os_str() == ":memory:" {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        options
            // WAL: readers and the settlement writer stay out of each
            // other's way
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL is durable against corruption; a power cut can lose
            // the very last commit, which the counter scheme tolerates
            .synchronous(SqliteSynchronous::Normal)
            // SQLite defaults this off; the settlement schema relies on it
            .foreign_keys(true)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle. Clones share the pool; hand one to the
/// checkout service and keep another for seeding or diagnostics.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database, configures SQLite, and
    /// applies pending migrations unless disabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.auto_migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Called by `new()` unless the config
    /// disabled it.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Items and tax rates.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// The settlement transaction and receipt reads.
    pub fn receipts(&self) -> ReceiptRepository {
        ReceiptRepository::new(self.pool.clone())
    }

    /// Stock ledger postings and the on-hand view.
    pub fn stock(&self) -> StockRepository {
        StockRepository::new(self.pool.clone())
    }

    /// Drains and closes the pool.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// True when the database still answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
