//! Product API Handlers
//!
//! Mutations take the catalog write gate and fsync, so they run on the
//! blocking pool.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::models::{Product, ProductCreate, ProductUpdate};

use super::{ProductBody, ProductId};
use crate::catalog::run_blocking;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Return at most this many products, oldest first
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
    pub products: Vec<Product>,
}

/// GET /api/products
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let mut products = state.catalog.list()?;
    if let Some(limit) = query.limit {
        products.truncate(limit);
    }
    Ok(Json(ProductListResponse { products }))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ProductId(id): ProductId,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .catalog
        .get_by_id(id)?
        .ok_or_else(|| AppError::product_not_found(id))?;
    Ok(Json(ProductResponse { product }))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    ProductBody(payload): ProductBody<ProductCreate>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let catalog = state.catalog.clone();
    let product = run_blocking(move || catalog.add(payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Product created".to_string(),
            product,
        }),
    ))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    ProductId(id): ProductId,
    ProductBody(payload): ProductBody<ProductUpdate>,
) -> AppResult<Json<MessageResponse>> {
    let catalog = state.catalog.clone();
    run_blocking(move || catalog.update(id, payload)).await?;
    Ok(Json(MessageResponse {
        message: format!("Product {id} updated"),
    }))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    ProductId(id): ProductId,
) -> AppResult<Json<DeletedResponse>> {
    let catalog = state.catalog.clone();
    let (_, products) = run_blocking(move || catalog.remove_and_list(id)).await?;
    Ok(Json(DeletedResponse {
        message: format!("Product {id} deleted"),
        products,
    }))
}
