//! Stores the user belongs to.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use adega_core::validation::validate_store;
use adega_core::{NewStore, Store};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> ApiResult<Json<Vec<Store>>> {
    let stores = state.db.stores().list_for_user(&session.user_id).await?;
    Ok(Json(stores))
}

/// Creates a store; the caller becomes its owner.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    ApiJson(input): ApiJson<NewStore>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    validate_store(&input)?;
    let store = state.db.stores().create(&session.user_id, &input).await?;

    info!(store_id = %store.id, owner = %session.user_id, "Store created");
    Ok((StatusCode::CREATED, Json(store)))
}
