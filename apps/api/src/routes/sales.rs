//! # Sale Endpoints
//!
//! ```text
//! POST /api/sales                 checkout (one transaction)
//! GET  /api/sales?from=&to=&status=&payment_method=&customer_id=&limit=
//! GET  /api/sales/export.csv      same filters, one row per line item
//! GET  /api/sales/{id}            header + items
//! POST /api/sales/{id}/cancel     { reason }, same business day only
//! ```

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use adega_core::export::{data_row_count, render_sales_csv};
use adega_core::{CoreError, NewSale, Sale, SaleFilter, SaleWithItems};
use adega_db::SaleReceipt;

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: String,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(request): ApiJson<NewSale>,
) -> ApiResult<(StatusCode, Json<SaleReceipt>)> {
    let receipt = state.db.sale_lifecycle().create_sale(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(filter): ApiQuery<SaleFilter>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list(&ctx, &filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SaleWithItems>> {
    let sale = state
        .db
        .sales()
        .get_with_items(&ctx, &id)
        .await?
        .ok_or(CoreError::SaleNotFound(id))?;
    Ok(Json(sale))
}

pub async fn cancel(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<CancelRequest>,
) -> ApiResult<Json<Sale>> {
    let sale = state
        .db
        .sale_lifecycle()
        .cancel_sale(&ctx, &id, &request.reason)
        .await?;
    Ok(Json(sale))
}

/// Semicolon CSV with a UTF-8 BOM, named after the business day.
pub async fn export_csv(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(filter): ApiQuery<SaleFilter>,
) -> ApiResult<impl IntoResponse> {
    let sales = state.db.sales().list_for_export(&ctx, &filter).await?;
    let calendar = state.db.calendar();
    let body = render_sales_csv(&sales, calendar)?;

    info!(
        store_id = %ctx.store_id,
        sales = sales.len(),
        rows = data_row_count(&sales),
        "Sales exported"
    );

    let filename = format!("sales-{}.csv", calendar.date_of(Utc::now()));
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    ))
}
