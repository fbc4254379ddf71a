//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──────────────► LifecycleError::Db (transactional services)     │
//! │       ▼                                                                 │
//! │  ApiError (in HTTP app) ← Serialized for the SPA                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SPA shows a toast                                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist in the current store
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second delivery for the same sale
    /// - Profile e-mail already registered
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a customer or store that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// NOT NULL constraint violation.
    ///
    /// `column` is extracted from SQLite's message
    /// (`NOT NULL constraint failed: <table>.<column>`), best effort.
    #[error("Missing required value: {column}")]
    NotNullViolation { column: String },

    /// CHECK constraint violation (negative stock, unknown enum value, ...).
    #[error("Constraint violated: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps a raw SQLite error message to a variant.
    ///
    /// ```text
    /// "UNIQUE constraint failed: deliveries.sale_id"   → UniqueViolation { field: "deliveries.sale_id" }
    /// "NOT NULL constraint failed: products.name"      → NotNullViolation { column: "name" }
    /// "CHECK constraint failed: stock_quantity >= 0"   → CheckViolation
    /// "FOREIGN KEY constraint failed"                  → ForeignKeyViolation
    /// ```
    pub fn from_sqlite_message(msg: &str) -> Self {
        if let Some(rest) = msg.split("UNIQUE constraint failed: ").nth(1) {
            DbError::UniqueViolation {
                field: rest.trim().to_string(),
                value: "unknown".to_string(),
            }
        } else if let Some(rest) = msg.split("NOT NULL constraint failed: ").nth(1) {
            let qualified = rest.split_whitespace().next().unwrap_or("unknown");
            let column = qualified.rsplit('.').next().unwrap_or(qualified);
            DbError::NotNullViolation {
                column: column.to_string(),
            }
        } else if msg.contains("CHECK constraint failed") {
            DbError::CheckViolation {
                message: msg.to_string(),
            }
        } else if msg.contains("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation {
                message: msg.to_string(),
            }
        } else {
            DbError::QueryFailed(msg.to_string())
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_null_column_extraction() {
        let err = DbError::from_sqlite_message("NOT NULL constraint failed: products.name");
        assert!(matches!(err, DbError::NotNullViolation { ref column } if column == "name"));
        assert_eq!(err.to_string(), "Missing required value: name");
    }

    #[test]
    fn test_unique_field_extraction() {
        let err = DbError::from_sqlite_message("UNIQUE constraint failed: deliveries.sale_id");
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "deliveries.sale_id"));
    }

    #[test]
    fn test_check_and_fk() {
        assert!(matches!(
            DbError::from_sqlite_message("CHECK constraint failed: stock_quantity >= 0"),
            DbError::CheckViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlite_message("FOREIGN KEY constraint failed"),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlite_message("no such table: x"),
            DbError::QueryFailed(_)
        ));
    }
}
