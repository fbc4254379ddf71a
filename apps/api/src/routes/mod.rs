//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  public          /health, /api/auth/register, /api/auth/login          │
//! │  user token      /api/auth/switch-store, /api/stores                   │
//! │  store token     everything else (CurrentStore extractor)              │
//! │  static          <public_upload_path>/*  product photos                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authentication is enforced by the extractors each handler takes, so a
//! handler without `CurrentUser` / `CurrentStore` is public by construction.

pub mod auth;
pub mod customers;
pub mod deliveries;
pub mod finance;
pub mod health;
pub mod products;
pub mod reports;
pub mod sales;
pub mod stock;
pub mod stores;

#[cfg(test)]
mod tests;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use adega_core::MAX_IMAGE_BYTES;

use crate::state::AppState;

/// Room for the multipart envelope around a maximum-size image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/switch-store", post(auth::switch_store));

    let stores = Router::new().route("/api/stores", get(stores::list).post(stores::create));

    let products = Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/low-stock", get(products::low_stock))
        .route(
            "/api/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route(
            "/api/products/{id}/image",
            post(products::upload_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD)),
        );

    let sales = Router::new()
        .route("/api/sales", get(sales::list).post(sales::create))
        .route("/api/sales/export.csv", get(sales::export_csv))
        .route("/api/sales/{id}", get(sales::get))
        .route("/api/sales/{id}/cancel", post(sales::cancel));

    let stock = Router::new()
        .route("/api/stock/adjustments", post(stock::adjust))
        .route("/api/stock/movements", get(stock::movements));

    let finance = Router::new()
        .route(
            "/api/finance/transactions",
            get(finance::list).post(finance::record),
        )
        .route("/api/finance/summary", get(finance::summary));

    let deliveries = Router::new()
        .route(
            "/api/deliveries",
            get(deliveries::list).post(deliveries::schedule),
        )
        .route("/api/deliveries/{id}", get(deliveries::get))
        .route("/api/deliveries/{id}/status", post(deliveries::change_status));

    let customers = Router::new()
        .route("/api/customers", get(customers::list).post(customers::create))
        .route("/api/customers/birthdays", get(customers::birthdays))
        .route(
            "/api/customers/{id}",
            get(customers::get).put(customers::update),
        )
        .route(
            "/api/customers/{id}/birthday-link",
            get(customers::birthday_link_for),
        );

    let reports = Router::new()
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/categories", get(reports::categories))
        .route("/api/reports/top-products", get(reports::top_products))
        .route("/api/reports/daily", get(reports::daily));

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .merge(auth)
        .merge(stores)
        .merge(products)
        .merge(sales)
        .merge(stock)
        .merge(finance)
        .merge(deliveries)
        .merge(customers)
        .merge(reports);

    let public_path = state.config.public_upload_path.trim_end_matches('/');
    if public_path.starts_with('/') && public_path.len() > 1 {
        router = router.nest_service(public_path, ServeDir::new(&state.config.upload_dir));
    }

    router
        .layer(cors_layer(state.config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(_)) => {
            warn!("cors_origin is not a valid header value, allowing any origin");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
