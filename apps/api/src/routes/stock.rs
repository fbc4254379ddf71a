//! Manual stock entries and the movement history.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use adega_core::{StockAdjustment, StockMovement};

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct MovementParams {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn adjust(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> ApiResult<(StatusCode, Json<StockMovement>)> {
    let movement = state.db.inventory().adjust_stock(&ctx, &adjustment).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Newest first; one product's history when `product_id` is given.
pub async fn movements(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<MovementParams>,
) -> ApiResult<Json<Vec<StockMovement>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let repo = state.db.stock_movements();
    let movements = match params.product_id.as_deref() {
        Some(product_id) => repo.for_product(&ctx, product_id, limit).await?,
        None => repo.list(&ctx, limit).await?,
    };
    Ok(Json(movements))
}
