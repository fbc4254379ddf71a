//! # adega-db: Database Layer for Adega
//!
//! SQLite persistence for the Adega backend, plus the transactional
//! services that keep stock, sales and the money ledger consistent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Adega Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     adega-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │   lifecycle    │   │  repository   │   │   │
//! │  │   │   (pool.rs)   │   │                │   │               │   │   │
//! │  │   │               │──►│ SaleLifecycle  │──►│ product, sale │   │   │
//! │  │   │ SqlitePool    │   │ InventoryLedger│   │ stock, finance│   │   │
//! │  │   │ Calendar      │   │ DeliveryTracker│   │ customer, ... │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) ── migrations/sqlite/*.sql embedded at compile time      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Store-scoped reads and single-statement writes
//! - [`lifecycle`] - Multi-table transactions (sales, stock, deliveries)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adega_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./adega.db")).await?;
//! let ctx = session.store_context()?;
//!
//! let receipt = db.sale_lifecycle().create_sale(&ctx, &request).await?;
//! let low = db.products().low_stock(&ctx).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use lifecycle::{
    DeliveryTracker, InventoryLedger, LifecycleError, LifecycleResult, SaleLifecycle, SaleReceipt,
};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::delivery::DeliveryRepository;
pub use repository::finance::FinancialRepository;
pub use repository::product::{ProductQuery, ProductRepository};
pub use repository::profile::ProfileRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockMovementRepository;
pub use repository::store::StoreRepository;
