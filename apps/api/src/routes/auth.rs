//! # Session Endpoints
//!
//! ```text
//! POST /api/auth/register      { name, email, password }  → token (no store)
//! POST /api/auth/login         { email, password }        → token (no store) + stores
//! POST /api/auth/switch-store  { store_id }               → token carrying store_id
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use adega_core::validation::{validate_email, validate_password, validate_required_text, MAX_NAME_LEN};
use adega_core::{CoreError, Profile, Store, StoreRole};

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchStoreRequest {
    pub store_id: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: Profile,
    pub stores: Vec<Store>,
}

#[derive(Debug, Serialize)]
pub struct StoreSessionResponse {
    pub token: String,
    pub expires_in: i64,
    pub store: Store,
    pub role: StoreRole,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = validate_required_text("name", &req.name, MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let hash = hash_password(&req.password)?;
    let user = state.db.profiles().create(&name, &req.email, &hash).await?;
    let token = state.jwt.issue(&user.id, None)?;

    info!(user_id = %user.id, "Profile registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            expires_in: state.jwt.lifetime_secs(),
            user,
            stores: Vec::new(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = match state.db.profiles().find_by_email(&req.email).await? {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            warn!(email = %req.email.trim(), "Failed login");
            return Err(CoreError::InvalidCredentials.into());
        }
    };

    let stores = state.db.stores().list_for_user(&user.id).await?;
    let token = state.jwt.issue(&user.id, None)?;

    info!(user_id = %user.id, stores = stores.len(), "Logged in");

    Ok(Json(AuthResponse {
        token,
        expires_in: state.jwt.lifetime_secs(),
        user,
        stores,
    }))
}

pub async fn switch_store(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    ApiJson(req): ApiJson<SwitchStoreRequest>,
) -> ApiResult<Json<StoreSessionResponse>> {
    let denied = || CoreError::StoreAccessDenied {
        store_id: req.store_id.clone(),
    };

    let role = state
        .db
        .stores()
        .membership(&req.store_id, &session.user_id)
        .await?
        .ok_or_else(denied)?;
    let store = state
        .db
        .stores()
        .get(&req.store_id)
        .await?
        .ok_or_else(|| CoreError::StoreNotFound(req.store_id.clone()))?;

    let token = state.jwt.issue(&session.user_id, Some(&store.id))?;

    info!(user_id = %session.user_id, store_id = %store.id, role = %role, "Store selected");

    Ok(Json(StoreSessionResponse {
        token,
        expires_in: state.jwt.lifetime_secs(),
        store,
        role,
    }))
}
