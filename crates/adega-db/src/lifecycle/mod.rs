//! # Transactional Services
//!
//! Multi-table writes that must succeed or fail as a unit.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleLifecycle::create_sale                                            │
//! │    BEGIN                                                                │
//! │    ├── re-read products          (find_in_store)                       │
//! │    ├── price + totals            (adega_core::checkout)                │
//! │    ├── INSERT sales, sale_items                                        │
//! │    ├── per line: guarded decrement + INSERT stock_movements (out)      │
//! │    ├── INSERT financial_transactions (in / sale)                       │
//! │    └── loyalty points                                                  │
//! │    COMMIT  ── any error before this line rolls everything back ──      │
//! │                                                                         │
//! │  SaleLifecycle::cancel_sale                                            │
//! │    BEGIN → restock (in) → flip status → ledger (out) → points → COMMIT │
//! │                                                                         │
//! │  InventoryLedger::adjust_stock                                         │
//! │    BEGIN → read → plan → compare-and-swap → movement → COMMIT          │
//! │                                                                         │
//! │  DeliveryTracker::schedule / advance                                   │
//! │    BEGIN → check sale / transition → guarded write → COMMIT            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping a `sqlx::Transaction` without committing rolls it back, so an
//! early `?` return is enough to undo partial work.

mod delivery;
mod inventory;
mod sale;

pub use delivery::DeliveryTracker;
pub use inventory::InventoryLedger;
pub use sale::{SaleLifecycle, SaleReceipt};

use thiserror::Error;

use crate::error::DbError;
use adega_core::{CoreError, ValidationError};

/// Failure of a transactional service: a business rule or the database.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        LifecycleError::Db(DbError::from(err))
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(err: ValidationError) -> Self {
        LifecycleError::Core(CoreError::Validation(err))
    }
}

impl LifecycleError {
    /// The business rule that rejected the operation, if that was the cause.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            LifecycleError::Core(err) => Some(err),
            LifecycleError::Db(_) => None,
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
