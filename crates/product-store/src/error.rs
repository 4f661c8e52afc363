use std::time::Duration;

use thiserror::Error;

use crate::ProductId;

pub use sqlx::Error as SqlxError;

/// Errors that can occur when interacting with the product store.
#[derive(Debug, Error)]
pub enum ProductStoreError {
    /// An update addressed a product that does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The call did not complete before its deadline.
    /// This is never reported as an empty result.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ProductStoreError {
    /// Returns true if the error is a missed deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProductStoreError::Timeout { .. })
    }
}

/// Result type for product store operations.
pub type Result<T> = std::result::Result<T, ProductStoreError>;
