//! Product service error types.

use std::time::Duration;

use common::{Decimal, ProductId};
use product_store::ProductStoreError;
use thiserror::Error;

use crate::report::RenderError;

/// A request that breaks an identifier or field rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A create payload carried an id; ids are assigned by the store.
    #[error("productId must be 0 when creating a product, got {0}")]
    IdOnCreate(ProductId),

    /// An update payload addressed a different product than the path.
    #[error("productId {body} does not match the addressed product {path}")]
    IdMismatch { path: ProductId, body: ProductId },

    /// Stock on hand cannot go below zero.
    #[error("quantityOnHand must not be negative, got {0}")]
    NegativeQuantity(i32),

    /// Prices cannot go below zero.
    #[error("pricePerUnit must not be negative, got {0}")]
    NegativePrice(Decimal),
}

/// Errors that can occur during product service operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product has the requested id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A report filter matched nothing.
    #[error("No products match the report filter")]
    NoMatches,

    /// The request was rejected before reaching the store.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// A store call missed its deadline.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// Connectivity or driver failure in the store.
    #[error("Store failure: {0}")]
    Infrastructure(#[source] ProductStoreError),

    /// The report template could not be rendered.
    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl From<ProductStoreError> for CatalogError {
    fn from(err: ProductStoreError) -> Self {
        match err {
            ProductStoreError::NotFound(id) => CatalogError::ProductNotFound(id),
            ProductStoreError::Timeout { operation, limit } => {
                CatalogError::Timeout { operation, limit }
            }
            other => CatalogError::Infrastructure(other),
        }
    }
}

/// Result type for product service operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
