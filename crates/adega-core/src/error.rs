//! # Error Types
//!
//! Domain-specific error types for adega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  adega-core errors (this file)                                         │
//! │  ├── CoreError        - Session, validation and resource-state errors  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  adega-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LifecycleError   - CoreError | DbError from transactional flows   │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What the SPA sees (serialized)                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LifecycleError → ApiError → SPA   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, sale id, quantities)
//! 3. Errors are enum variants, never String
//! 4. Every variant here is raised BEFORE any write happens

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::DeliveryStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are translated to `{ code, message }` payloads by the HTTP layer.
#[derive(Debug, Error)]
pub enum CoreError {
    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------
    /// No authenticated user on the request.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The user is authenticated but has not selected a store.
    ///
    /// ## When This Occurs
    /// - Right after login, before `switch-store`
    /// - The selected store was removed from the user's memberships
    #[error("No store selected")]
    NoStoreSelected,

    /// The user is not a member of the requested store.
    #[error("Access to store {store_id} denied")]
    StoreAccessDenied { store_id: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    // -------------------------------------------------------------------------
    // Sale validation
    // -------------------------------------------------------------------------
    /// Checkout was attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Subtotal minus discount is zero or negative.
    #[error("Sale total must be positive (got {total_cents} cents)")]
    InvalidTotal { total_cents: i64 },

    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    // -------------------------------------------------------------------------
    // Resource state
    // -------------------------------------------------------------------------
    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (Malbec × 5)
    ///      │
    ///      ▼
    /// Re-read product inside the transaction: stock = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Malbec", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Nothing written, SPA shows: "Only 3 Malbec in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the current store
    /// - Product was deactivated (soft delete)
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// Sale is already cancelled. Cancelled is terminal.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Sale was not created on the current business day.
    #[error("Sale {sale_id} from {sale_date} can only be cancelled on the day it was made")]
    CancellationWindowExpired { sale_id: String, sale_date: NaiveDate },

    /// Requested delivery status change is not the next step of the chain.
    #[error("Delivery cannot move from {from} to {to}")]
    InvalidDeliveryTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    /// Deliveries cannot be scheduled for cancelled sales.
    #[error("Sale {0} is cancelled and cannot be delivered")]
    SaleNotDeliverable(String),

    /// The row changed between read and write.
    ///
    /// ## When This Occurs
    /// - Two stock adjustments on the same product at the same moment
    /// - A sale decremented the product while an adjustment was computed
    ///
    /// The operation is not retried; the operator re-submits.
    #[error("{entity} {id} was modified concurrently, please retry")]
    ConcurrentModification { entity: &'static str, id: String },

    /// Uploaded image rejected before storage.
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
