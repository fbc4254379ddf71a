//! Delivery queue.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use adega_core::{CoreError, Delivery, DeliveryStatus, NewDelivery};

use crate::auth::CurrentStore;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeliveryParams {
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: DeliveryStatus,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<DeliveryParams>,
) -> ApiResult<Json<Vec<Delivery>>> {
    Ok(Json(state.db.deliveries().list(&ctx, params.status).await?))
}

pub async fn schedule(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(input): ApiJson<NewDelivery>,
) -> ApiResult<(StatusCode, Json<Delivery>)> {
    let delivery = state.db.delivery_tracker().schedule(&ctx, &input).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Delivery>> {
    let delivery = state
        .db
        .deliveries()
        .get(&ctx, &id)
        .await?
        .ok_or(CoreError::DeliveryNotFound(id))?;
    Ok(Json(delivery))
}

pub async fn change_status(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Json<Delivery>> {
    let delivery = state
        .db
        .delivery_tracker()
        .advance(&ctx, &id, change.status)
        .await?;
    Ok(Json(delivery))
}
