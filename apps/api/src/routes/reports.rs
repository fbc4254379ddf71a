//! Dashboard reports. Every aggregate is computed by SQLite.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use adega_core::{CategoryTotal, DailyTotal, DateRange, SalesSummary, TopProduct};

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::state::AppState;

const DEFAULT_TOP_PRODUCTS: i64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ReportParams {
    fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }
}

pub async fn summary(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<SalesSummary>> {
    Ok(Json(state.db.reports().sales_summary(&ctx, &params.range()).await?))
}

pub async fn categories(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<Vec<CategoryTotal>>> {
    Ok(Json(
        state.db.reports().category_breakdown(&ctx, &params.range()).await?,
    ))
}

pub async fn top_products(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<Vec<TopProduct>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_PRODUCTS);
    Ok(Json(
        state.db.reports().top_products(&ctx, &params.range(), limit).await?,
    ))
}

/// Totals per business day (shop wall clock, not UTC).
pub async fn daily(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<Vec<DailyTotal>>> {
    Ok(Json(state.db.reports().daily_totals(&ctx, &params.range()).await?))
}
