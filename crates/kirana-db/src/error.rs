//! # Database Errors
//!
//! Classified persistence failures.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error ──► DbError (this module) ──► CheckoutError               │
//! │                                                                         │
//! │  Constraint failures are pulled apart so callers can react:            │
//! │    UNIQUE  → UniqueViolation   (duplicate barcode, lost number race)   │
//! │    FK      → ForeignKeyViolation (line references an unknown item)     │
//! │                                                                         │
//! │  A DbError escaping the settlement transaction surfaces to callers    │
//! │  as SettlementPersistenceFailed: the receipt was NOT created and       │
//! │  funds must not be considered captured.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// A classified database failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// The addressed row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE constraint fired. `constraint` is SQLite's
    /// `table.column` rendering when the message exposes it.
    #[error("unique constraint violated on {constraint}")]
    UniqueViolation { constraint: String },

    /// A FOREIGN KEY constraint fired, e.g. a receipt line naming an
    /// item id the catalog has never seen.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Could not open the database or obtain a connection.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A statement failed for a non-constraint reason.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Could not begin or commit a transaction.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection was busy past the acquire timeout.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits none of the above.
    #[error("database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// SQLite reports constraint failures only through the error message:
//   "UNIQUE constraint failed: items.barcode"
//   "FOREIGN KEY constraint failed"
fn classify_database_error(message: &str) -> DbError {
    if let Some(constraint) = message.strip_prefix("UNIQUE constraint failed: ") {
        DbError::UniqueViolation {
            constraint: constraint.to_string(),
        }
    } else if message.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation(message.to_string())
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("row", "unknown"),
            sqlx::Error::Database(db_err) => classify_database_error(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_unique_violation_with_constraint() {
        let err = classify_database_error("UNIQUE constraint failed: items.barcode");
        match err {
            DbError::UniqueViolation { constraint } => assert_eq!(constraint, "items.barcode"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classifies_foreign_key_violation() {
        let err = classify_database_error("FOREIGN KEY constraint failed");
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_other_messages_are_query_failures() {
        let err = classify_database_error("no such table: receipts");
        assert!(matches!(err, DbError::QueryFailed(_)));
    }
}
