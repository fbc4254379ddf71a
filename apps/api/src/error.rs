//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Adega                                  │
//! │                                                                         │
//! │  SPA                          Rust Backend                              │
//! │  ───                          ────────────                              │
//! │                                                                         │
//! │  POST /api/sales                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<Json<T>, ApiError>                                       │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Business rule? ── CoreError::InsufficientStock ──┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Database? ─────── DbError::QueryFailed ──────► ApiError ──────►│  │
//! │  │         │                                    (logged if 5xx)    │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  409 { "code": "INSUFFICIENT_STOCK",                                   │
//! │        "message": "Insufficient stock for Malbec: available 3, ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged with their detail and answered with a
//! generic message; the SPA never sees SQL.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use adega_core::export::ExportError;
use adega_core::{CoreError, ValidationError};
use adega_db::{DbError, LifecycleError};

use crate::storage::StorageError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6f0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// const res = await fetch('/api/sales', { method: 'POST', body });
/// if (!res.ok) {
///   const e = await res.json();
///   switch (e.code) {
///     case 'INSUFFICIENT_STOCK':
///       refreshCart();
///       break;
///     case 'NO_STORE_SELECTED':
///       router.push('/stores');
///       break;
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Session (401 / 403)
    NotAuthenticated,
    InvalidToken,
    InvalidCredentials,
    NoStoreSelected,
    StoreAccessDenied,

    /// Input validation failed (400)
    ValidationError,
    /// Malformed body, query or path (400)
    BadRequest,
    EmptyCart,
    InvalidTotal,
    InvalidDiscount,
    CartTooLarge,
    QuantityTooLarge,
    InvalidImage,

    /// Resource not found (404)
    NotFound,

    // Resource state (409 / 422)
    InsufficientStock,
    AlreadyCancelled,
    CancellationWindowExpired,
    InvalidDeliveryTransition,
    SaleNotDeliverable,
    ConcurrentModification,
    Duplicate,
    InvalidReference,

    /// Database operation failed (500)
    DatabaseError,
    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            NotAuthenticated | InvalidToken | InvalidCredentials => StatusCode::UNAUTHORIZED,
            NoStoreSelected | StoreAccessDenied => StatusCode::FORBIDDEN,
            ValidationError | BadRequest | EmptyCart | InvalidTotal | InvalidDiscount
            | CartTooLarge | QuantityTooLarge | InvalidImage | InvalidReference => {
                StatusCode::BAD_REQUEST
            }
            NotFound => StatusCode::NOT_FOUND,
            InsufficientStock | AlreadyCancelled | InvalidDeliveryTransition
            | SaleNotDeliverable | ConcurrentModification | Duplicate => StatusCode::CONFLICT,
            CancellationWindowExpired => StatusCode::UNPROCESSABLE_ENTITY,
            DatabaseError | Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidToken, message)
    }

    /// Logs `detail` and hides it behind a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotAuthenticated => ErrorCode::NotAuthenticated,
            CoreError::NoStoreSelected => ErrorCode::NoStoreSelected,
            CoreError::StoreAccessDenied { .. } => ErrorCode::StoreAccessDenied,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InvalidTotal { .. } => ErrorCode::InvalidTotal,
            CoreError::InvalidDiscount { .. } => ErrorCode::InvalidDiscount,
            CoreError::CartTooLarge { .. } => ErrorCode::CartTooLarge,
            CoreError::QuantityTooLarge { .. } => ErrorCode::QuantityTooLarge,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::DeliveryNotFound(_)
            | CoreError::StoreNotFound(_) => ErrorCode::NotFound,
            CoreError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            CoreError::CancellationWindowExpired { .. } => ErrorCode::CancellationWindowExpired,
            CoreError::InvalidDeliveryTransition { .. } => ErrorCode::InvalidDeliveryTransition,
            CoreError::SaleNotDeliverable(_) => ErrorCode::SaleNotDeliverable,
            CoreError::ConcurrentModification { .. } => ErrorCode::ConcurrentModification,
            CoreError::InvalidImage { .. } => ErrorCode::InvalidImage,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        let message = match err {
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::new(ErrorCode::InvalidReference, "Invalid reference")
            }
            DbError::NotNullViolation { column } => {
                ApiError::new(ErrorCode::ValidationError, format!("{column} is required"))
            }
            DbError::CheckViolation { message } => {
                tracing::warn!(%message, "Check constraint violated");
                ApiError::new(ErrorCode::ValidationError, "Value out of allowed range")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy, try again")
            }
            DbError::ConnectionFailed(e)
            | DbError::MigrationFailed(e)
            | DbError::QueryFailed(e)
            | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Core(e) => e.into(),
            LifecycleError::Db(e) => e.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::internal(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::internal(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::bad_request(format!("Multipart error: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adega_core::DeliveryStatus;

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "only 3 left");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert_eq!(json["message"], "only 3 left");
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        let cases = [
            (CoreError::NoStoreSelected, StatusCode::FORBIDDEN),
            (CoreError::EmptyCart, StatusCode::BAD_REQUEST),
            (CoreError::SaleNotFound("s".into()), StatusCode::NOT_FOUND),
            (CoreError::AlreadyCancelled("s".into()), StatusCode::CONFLICT),
            (
                CoreError::InvalidDeliveryTransition {
                    from: DeliveryStatus::Pending,
                    to: DeliveryStatus::Delivered,
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (core, status) in cases {
            assert_eq!(ApiError::from(core).status(), status);
        }
    }

    #[test]
    fn test_validation_message_is_unwrapped() {
        let err: ApiError = CoreError::from(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_database_detail_is_hidden() {
        let err: ApiError = DbError::QueryFailed("no such column: secret".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }
}
