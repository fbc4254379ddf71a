//! # Adega API
//!
//! HTTP/JSON server for the Adega single-page app.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Adega API Server                               │
//! │                                                                         │
//! │  SPA ──► axum Router ──► extractors ──► handler ──► adega-db ──► SQLite │
//! │           │ TraceLayer     │ CurrentUser               │               │
//! │           │ CorsLayer      │ CurrentStore              │ SaleLifecycle  │
//! │           │                │ ApiJson / ApiQuery        │ InventoryLedger│
//! │           │                                            │ repositories  │
//! │           ▼                                                             │
//! │      ApiError { code, message } on every failure                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: `adega.toml` and `ADEGA_*` environment variables.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod storage;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_router;
pub use state::AppState;
