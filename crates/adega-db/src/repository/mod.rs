//! # Repository Module
//!
//! Store-scoped data access for Adega.
//!
//! ## Two Layers Per Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.products().search(&ctx, &query)                            │
//! │       ▼                                                                 │
//! │  ProductRepository { pool }        ← pool-backed, one statement each  │
//! │       │                                                                 │
//! │       │  find_in_store(executor, ...)                                  │
//! │       ▼                                                                 │
//! │  pub(crate) executor functions     ← generic over Executor, so the    │
//! │       ▲                              lifecycle services call the same │
//! │       │  &mut *tx                    SQL inside one transaction       │
//! │  SaleLifecycle / InventoryLedger / DeliveryTracker                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every public method takes a [`StoreContext`](adega_core::StoreContext)
//! and filters by its `store_id`. A row of another store behaves exactly
//! like a missing row.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - catalog and stock primitives
//! - [`SaleRepository`](sale::SaleRepository) - sale reads and export rows
//! - [`StockMovementRepository`](stock::StockMovementRepository) - stock audit trail
//! - [`FinancialRepository`](finance::FinancialRepository) - money ledger
//! - [`DeliveryRepository`](delivery::DeliveryRepository) - delivery reads
//! - [`CustomerRepository`](customer::CustomerRepository) - customers and loyalty
//! - [`StoreRepository`](store::StoreRepository) - stores and membership
//! - [`ProfileRepository`](profile::ProfileRepository) - user accounts
//! - [`ReportRepository`](report::ReportRepository) - grouped aggregates

pub mod customer;
pub mod delivery;
pub mod finance;
pub mod product;
pub mod profile;
pub mod report;
pub mod sale;
pub mod stock;
pub mod store;

use adega_core::DateRange;
use sqlx::{QueryBuilder, Sqlite};

/// Fresh UUID v4 as a string.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Appends `AND column >= from AND column < to` for the bounds that are set.
pub(crate) fn push_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, range: &DateRange) {
    if let Some(from) = range.from {
        qb.push(format!(" AND {column} >= ")).push_bind(from);
    }
    if let Some(to) = range.to {
        qb.push(format!(" AND {column} < ")).push_bind(to);
    }
}

// =============================================================================
// Test fixtures
// =============================================================================
