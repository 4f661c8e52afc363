//! API error types with HTTP response mapping.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;

use crate::receipts::ReceiptError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// API-level error type that maps to HTTP responses.
///
/// Server-side failures are logged and answered with a generic message so
/// query text and driver errors never reach the client.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Upload over the body limit.
    PayloadTooLarge(String),
    /// Product service error.
    Catalog(CatalogError),
    /// Receipt storage error.
    Receipt(ReceiptError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Receipt(err) => receipt_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::ProductNotFound(_) | CatalogError::NoMatches => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CatalogError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::Timeout { .. } => {
            tracing::error!(error = %err, "store call timed out");
            internal()
        }
        CatalogError::Infrastructure(_) => {
            tracing::error!(error = %err, "store failure");
            internal()
        }
        CatalogError::Render(_) => {
            tracing::error!(error = %err, "report rendering failed");
            internal()
        }
    }
}

fn receipt_error_to_response(err: ReceiptError) -> (StatusCode, String) {
    match &err {
        ReceiptError::InvalidName(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ReceiptError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ReceiptError::Io(_) => {
            tracing::error!(error = %err, "receipt storage failure");
            internal()
        }
    }
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<ReceiptError> for ApiError {
    fn from(err: ReceiptError) -> Self {
        ApiError::Receipt(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}
