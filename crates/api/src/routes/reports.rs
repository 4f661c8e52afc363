//! Report download endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::IntoResponse;
use catalog::REPORT_FILENAME;
use common::ProductFilter;
use product_store::ProductStore;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/products/reports — renders matching products as an HTML
/// attachment.
#[tracing::instrument(skip(state, payload))]
pub async fn generate<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ProductFilter>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(filter) = payload?;
    let report = state.products.generate_report(&filter).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        report.html,
    ))
}
