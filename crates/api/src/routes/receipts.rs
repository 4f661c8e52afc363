//! Receipt upload and download endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use product_store::ProductStore;

use crate::AppState;
use crate::error::ApiError;
use crate::receipts::Receipt;

/// Multipart field carrying the uploaded file.
const RECEIPT_FIELD: &str = "receipt";

/// GET /api/receipts — lists stored receipts.
#[tracing::instrument(skip(state))]
pub async fn list<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    Ok(Json(state.receipts.list().await?))
}

/// POST /api/receipts — stores the file sent in the `receipt` field.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Receipt>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RECEIPT_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::BadRequest("receipt has no file name".to_string()))?;
        let contents = field.bytes().await?;

        let receipt = state.receipts.save(&name, &contents).await?;
        tracing::info!(name = %receipt.name, bytes = contents.len(), "receipt stored");
        return Ok((StatusCode::CREATED, Json(receipt)));
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field \"{RECEIPT_FIELD}\""
    )))
}

/// GET /api/receipts/{name} — downloads a receipt as an attachment.
#[tracing::instrument(skip(state))]
pub async fn download<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contents = state.receipts.open(&name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        contents,
    ))
}
