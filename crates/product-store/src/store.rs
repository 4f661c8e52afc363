use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Product, ProductFilter, ProductId, ProductStoreError, Result};

/// Deadlines applied to store calls.
///
/// `report` bounds the frequent, cheap reads (snapshot and search); `crud`
/// bounds single-row reads and writes that may contend on locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub report: Duration,
    pub crud: Duration,
}

impl StoreTimeouts {
    pub const DEFAULT_REPORT: Duration = Duration::from_secs(3);
    pub const DEFAULT_CRUD: Duration = Duration::from_secs(15);

    /// Uses the same deadline for every call.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            report: limit,
            crud: limit,
        }
    }
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            report: Self::DEFAULT_REPORT,
            crud: Self::DEFAULT_CRUD,
        }
    }
}

/// Core trait for product store implementations.
///
/// All implementations must be thread-safe (Send + Sync) and bound every
/// call by a deadline, reporting expiry as [`ProductStoreError::Timeout`].
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads a single product. Returns None if no row matches.
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Loads the whole catalog, ordered by id.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Loads the `n` products with the most stock on hand.
    async fn top_n(&self, n: usize) -> Result<Vec<Product>>;

    /// Inserts a product and returns the id the store assigned to it.
    /// The product's own id is ignored.
    async fn insert(&self, product: Product) -> Result<ProductId>;

    /// Replaces every mutable field of the product addressed by
    /// `product.product_id`.
    ///
    /// Fails with `NotFound` if no row has that id.
    async fn update(&self, product: Product) -> Result<()>;

    /// Deletes a product. Deleting an id that does not exist succeeds.
    async fn remove(&self, id: ProductId) -> Result<()>;

    /// Loads the products matching every populated filter field, with text
    /// columns lower-cased. An empty filter matches the whole catalog.
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
}

/// Runs a store call under a deadline.
///
/// When the deadline passes the inner future is dropped, which returns its
/// pooled connection and cancels the in-flight query.
pub(crate) async fn with_deadline<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    metrics::counter!("product_store_queries_total", "operation" => operation).increment(1);
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            metrics::counter!("product_store_timeouts_total", "operation" => operation)
                .increment(1);
            tracing::warn!(operation, ?limit, "store call exceeded its deadline");
            Err(ProductStoreError::Timeout { operation, limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts() {
        let timeouts = StoreTimeouts::default();
        assert_eq!(timeouts.report, Duration::from_secs(3));
        assert_eq!(timeouts.crud, Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_is_a_timeout_not_an_empty_result() {
        let result: Result<Vec<Product>> = with_deadline("slow", Duration::from_secs(3), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        })
        .await;

        match result {
            Err(ProductStoreError::Timeout { operation, limit }) => {
                assert_eq!(operation, "slow");
                assert_eq!(limit, Duration::from_secs(3));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn calls_within_deadline_pass_through() {
        let result = with_deadline("fast", Duration::from_secs(3), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
