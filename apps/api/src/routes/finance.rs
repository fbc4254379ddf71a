//! Money ledger: manual entries, listing and the period balance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use adega_core::validation::validate_financial_entry;
use adega_core::{DateRange, FinancialSummary, FinancialTransaction, NewFinancialTransaction};

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct LedgerParams {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl LedgerParams {
    fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<LedgerParams>,
) -> ApiResult<Json<Vec<FinancialTransaction>>> {
    let entries = state
        .db
        .finance()
        .list(&ctx, &params.range(), params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(entries))
}

pub async fn record(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(input): ApiJson<NewFinancialTransaction>,
) -> ApiResult<(StatusCode, Json<FinancialTransaction>)> {
    validate_financial_entry(&input)?;
    let entry = state.db.finance().record(&ctx, &input).await?;

    info!(
        entry_id = %entry.id,
        kind = %entry.transaction_type,
        category = %entry.category,
        amount_cents = entry.amount_cents,
        "Ledger entry recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn summary(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<LedgerParams>,
) -> ApiResult<Json<FinancialSummary>> {
    let summary = state.db.reports().financial_summary(&ctx, &params.range()).await?;
    Ok(Json(summary))
}
