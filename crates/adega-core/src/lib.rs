//! # adega-core: Pure Business Logic for Adega
//!
//! This crate holds the wine shop's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Adega Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SPA (generated TS types)                     │   │
//! │  │   Catalog ──► POS cart ──► Sales ──► Deliveries ──► Reports    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    auth, request parsing, error mapping                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ adega-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │ checkout │ │ cancellation     │  │   │
//! │  │   │ Product  │ │  Money   │ │ totals   │ │ same-day window  │  │   │
//! │  │   │ Sale     │ │  R$ fmt  │ │ pricing  │ │ calendar         │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  stock   │ │  export  │ │promotion │ │ upload / session │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK READS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    adega-db (Database Layer)                    │   │
//! │  │        SQLite, repositories, transactional sale lifecycle       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types and closed enumerations
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//! - [`session`] - Session and explicit store context
//! - [`checkout`] - Cart validation, pricing, totals, loyalty points
//! - [`cancellation`] - Same-day cancellation rule
//! - [`calendar`] - Business-day calendar (UTC offset)
//! - [`stock`] - Stock movement math
//! - [`export`] - Sales CSV rendering
//! - [`promotion`] - Birthday deep links
//! - [`upload`] - Product image checks
//!
//! ## Example Usage
//!
//! ```rust
//! use adega_core::money::Money;
//! use adega_core::stock::apply_movement;
//! use adega_core::StockMovementType;
//!
//! let price = Money::from_cents(4990);
//! assert_eq!(price.to_string(), "R$ 49,90");
//!
//! // Losses never drive stock below zero
//! assert_eq!(apply_movement(StockMovementType::Loss, 2, 5), 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calendar;
pub mod cancellation;
pub mod checkout;
pub mod error;
pub mod export;
pub mod money;
pub mod promotion;
pub mod session;
pub mod stock;
pub mod types;
pub mod upload;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calendar::BusinessCalendar;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{Session, StoreContext};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps a checkout transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted for a product or a cart line (R$ 1.000.000,00).
///
/// With `MAX_ITEM_QUANTITY` and `MAX_CART_ITEMS` this keeps every sale
/// total far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Loyalty points from which a customer is treated as VIP.
pub const VIP_POINTS_THRESHOLD: i64 = 500;

/// Largest accepted product photo (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Ledger category of the entry posted by a sale.
pub const CATEGORY_SALE: &str = "sale";

/// Ledger category of the entry posted by a sale cancellation.
pub const CATEGORY_SALE_CANCELLATION: &str = "sale_cancellation";
