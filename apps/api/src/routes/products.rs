//! # Catalog Endpoints
//!
//! ```text
//! GET    /api/products?q=&category=&include_inactive=&limit=
//! POST   /api/products
//! GET    /api/products/low-stock
//! GET    /api/products/{id}
//! PUT    /api/products/{id}
//! DELETE /api/products/{id}              (soft delete)
//! POST   /api/products/{id}/image        (multipart, field "file")
//! ```

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use adega_core::upload::validate_image;
use adega_core::validation::{validate_new_product, validate_product_update, validate_search_query};
use adega_core::{CoreError, NewProduct, Product, ProductCategory, ProductUpdate};
use adega_db::ProductQuery;

use crate::auth::CurrentStore;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::storage::product_image_key;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiQuery(params): ApiQuery<ProductListParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let query = ProductQuery {
        text: validate_search_query(params.q.as_deref().unwrap_or(""))?,
        category: params.category,
        include_inactive: params.include_inactive,
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
    };
    let products = state.db.products().search(&ctx, &query).await?;
    Ok(Json(products))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    validate_new_product(&input)?;
    let product = state.db.products().create(&ctx, &input).await?;

    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn low_stock(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().low_stock(&ctx).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get(&ctx, &id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;
    Ok(Json(product))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    validate_product_update(&input)?;
    let product = state.db.products().update(&ctx, &id, &input).await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.db.products().soft_delete(&ctx, &id).await?;
    info!(product_id = %id, "Product deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the product photo. The image is checked before anything is stored.
pub async fn upload_image(
    State(state): State<AppState>,
    CurrentStore(ctx): CurrentStore,
    ApiPath(id): ApiPath<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Product>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if matches!(field.name(), Some("file") | Some("image")) {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await?.to_vec();
            upload = Some((content_type, data));
            break;
        }
    }

    let (content_type, data) =
        upload.ok_or_else(|| ApiError::bad_request("No file provided (field \"file\")"))?;

    let kind = validate_image(&content_type, &data)?;

    let product = state
        .db
        .products()
        .get(&ctx, &id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

    let key = product_image_key(&ctx.store_id, &product.id, kind);
    let url = state.images.put(&key, &data).await?;
    state.db.products().set_image_url(&ctx, &product.id, &url).await?;

    info!(product_id = %product.id, url = %url, bytes = data.len(), "Product image updated");

    Ok(Json(Product {
        image_url: Some(url),
        ..product
    }))
}
