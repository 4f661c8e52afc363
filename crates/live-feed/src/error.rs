use product_store::ProductStoreError;
use thiserror::Error;

/// Errors that can occur while serving a live feed connection.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Polling the store for a snapshot failed.
    #[error("Snapshot poll failed: {0}")]
    Store(#[from] ProductStoreError),

    /// A snapshot could not be serialized.
    #[error("Snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The client channel failed.
    #[error("Channel error: {0}")]
    Channel(String),
}

/// Result type for live feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
