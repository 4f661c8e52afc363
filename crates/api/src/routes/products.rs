//! Product CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::{Product, ProductId};
use product_store::ProductStore;

use crate::AppState;
use crate::error::ApiError;

/// Parses a path segment into a product id.
///
/// A segment that is not a number names no product, so it is a 404 rather
/// than a 400.
pub(crate) fn parse_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Product not found: {raw}")))
}

/// GET /api/products — returns the whole catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list_products().await?;
    Ok(Json(products))
}

/// GET /api/products/{id} — returns one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.products.get_product(id).await?;
    Ok(Json(product))
}

/// POST /api/products — creates a product and points at it via `Location`.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Product>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(product) = payload?;
    let id = state.products.create_product(product).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/products/{id}"))],
    )
        .into_response())
}

/// PUT /api/products/{id} — replaces a product's fields.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<Product>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let Json(product) = payload?;
    state.products.update_product(id, product).await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/products/{id} — removes a product. Deleting twice is fine.
#[tracing::instrument(skip(state))]
pub async fn delete<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.products.delete_product(id).await?;
    Ok(StatusCode::ACCEPTED)
}
