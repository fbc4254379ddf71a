//! # Customer Endpoints
//!
//! ```text
//! GET  /api/customers?q=&limit=
//! POST /api/customers
//! GET  /api/customers/birthdays?month=     (defaults to the current month)
//! GET  /api/customers/{id}
//! PUT  /api/customers/{id}
//! GET  /api/customers/{id}/birthday-link   (messaging deep link, nothing is sent)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use adega_core::promotion::{birthday_link, birthday_message};
use adega_core::validation::{validate_customer, validate_search_query};
use adega_core::{CoreError, Customer, CustomerInput, ValidationError};

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BirthdayParams {
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BirthdayLink {
    pub customer_id: String,
    pub message: String,
    pub url: String,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<CustomerParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let text = validate_search_query(params.q.as_deref().unwrap_or(""))?;
    let customers = state
        .db
        .customers()
        .search(&ctx, &text, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(customers))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(input): ApiJson<CustomerInput>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    validate_customer(&input)?;
    let customer = state.db.customers().create(&ctx, &input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .db
        .customers()
        .get(&ctx, &id)
        .await?
        .ok_or(CoreError::CustomerNotFound(id))?;
    Ok(Json(customer))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<CustomerInput>,
) -> ApiResult<Json<Customer>> {
    validate_customer(&input)?;
    Ok(Json(state.db.customers().update(&ctx, &id, &input).await?))
}

pub async fn birthdays(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<BirthdayParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let month = match params.month {
        Some(month @ 1..=12) => month,
        Some(_) => {
            return Err(ValidationError::OutOfRange {
                field: "month".to_string(),
                min: 1,
                max: 12,
            }
            .into())
        }
        None => state.db.calendar().date_of(Utc::now()).month(),
    };

    Ok(Json(state.db.customers().birthdays_in_month(&ctx, month).await?))
}

pub async fn birthday_link_for(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<BirthdayLink>> {
    let customer = state
        .db
        .customers()
        .get(&ctx, &id)
        .await?
        .ok_or(CoreError::CustomerNotFound(id))?;
    let store = state
        .db
        .stores()
        .get(&ctx.store_id)
        .await?
        .ok_or_else(|| CoreError::StoreNotFound(ctx.store_id.clone()))?;

    let url = birthday_link(&customer, &store.name)?;

    Ok(Json(BirthdayLink {
        message: birthday_message(&customer.name, &store.name),
        customer_id: customer.id,
        url: url.to_string(),
    }))
}
