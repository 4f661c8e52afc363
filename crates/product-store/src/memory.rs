use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    FilterQuery, Product, ProductFilter, ProductId, ProductStoreError, Result,
    store::{ProductStore, StoreTimeouts, with_deadline},
};

#[derive(Debug, Default)]
struct InMemoryState {
    products: BTreeMap<ProductId, Product>,
    last_id: i32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    latency: Option<Duration>,
    failing: bool,
}

/// In-memory product store implementation for testing.
///
/// Applies the same deadlines and search semantics as the PostgreSQL store.
/// Latency and failures can be injected to exercise timeout and
/// infrastructure-error paths.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    state: Arc<RwLock<InMemoryState>>,
    faults: Arc<std::sync::RwLock<Faults>>,
    timeouts: StoreTimeouts,
}

impl InMemoryProductStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty store with explicit deadlines.
    pub fn with_timeouts(timeouts: StoreTimeouts) -> Self {
        Self {
            timeouts,
            ..Self::default()
        }
    }

    /// Delays every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.faults.write().unwrap_or_else(PoisonError::into_inner).latency = latency;
    }

    /// Makes every subsequent call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.faults.write().unwrap_or_else(PoisonError::into_inner).failing = failing;
    }

    /// Returns the number of stored products.
    pub async fn len(&self) -> usize {
        self.state.read().await.products.len()
    }

    /// Returns true if the store holds no products.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn apply_faults(&self) -> Result<()> {
        let faults = *self.faults.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = faults.latency {
            tokio::time::sleep(latency).await;
        }
        if faults.failing {
            return Err(ProductStoreError::Database(sqlx::Error::Protocol(
                "injected failure".to_string(),
            )));
        }
        Ok(())
    }
}

fn lower_cased(mut product: Product) -> Product {
    product.manufacturer = product.manufacturer.to_lowercase();
    product.sku = product.sku.to_lowercase();
    product.product_name = product.product_name.to_lowercase();
    product
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        with_deadline("get", self.timeouts.crud, async {
            self.apply_faults().await?;
            Ok(self.state.read().await.products.get(&id).cloned())
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Product>> {
        with_deadline("list", self.timeouts.crud, async {
            self.apply_faults().await?;
            Ok(self.state.read().await.products.values().cloned().collect())
        })
        .await
    }

    async fn top_n(&self, n: usize) -> Result<Vec<Product>> {
        with_deadline("top_n", self.timeouts.report, async {
            self.apply_faults().await?;
            let state = self.state.read().await;
            let mut products: Vec<_> = state.products.values().cloned().collect();
            // BTreeMap iteration is id-ordered and the sort is stable, so ties keep id order
            products.sort_by(|a, b| b.quantity_on_hand.cmp(&a.quantity_on_hand));
            products.truncate(n);
            Ok(products)
        })
        .await
    }

    async fn insert(&self, product: Product) -> Result<ProductId> {
        with_deadline("insert", self.timeouts.crud, async {
            self.apply_faults().await?;
            let mut state = self.state.write().await;
            state.last_id += 1;
            let id = ProductId::new(state.last_id);
            let price = product.price();
            let mut stored = product.with_id(id);
            stored.price_per_unit = price;
            state.products.insert(id, stored);
            Ok(id)
        })
        .await
    }

    async fn update(&self, product: Product) -> Result<()> {
        with_deadline("update", self.timeouts.crud, async {
            self.apply_faults().await?;
            let mut state = self.state.write().await;
            let id = product.product_id;
            match state.products.get_mut(&id) {
                Some(existing) => {
                    let price = product.price();
                    *existing = product;
                    existing.price_per_unit = price;
                    Ok(())
                }
                None => Err(ProductStoreError::NotFound(id)),
            }
        })
        .await
    }

    async fn remove(&self, id: ProductId) -> Result<()> {
        with_deadline("remove", self.timeouts.crud, async {
            self.apply_faults().await?;
            self.state.write().await.products.remove(&id);
            Ok(())
        })
        .await
    }

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let query = FilterQuery::from_filter(filter);

        with_deadline("search", self.timeouts.report, async {
            self.apply_faults().await?;
            let state = self.state.read().await;
            Ok(state
                .products
                .values()
                .filter(|p| query.matches(p))
                .cloned()
                .map(lower_cased)
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use common::Decimal;

    use super::*;

    fn product(name: &str, manufacturer: &str, quantity: i32) -> Product {
        Product {
            product_id: ProductId::UNASSIGNED,
            manufacturer: manufacturer.to_string(),
            sku: format!("{}-SKU", name.to_uppercase()),
            upc: "000".to_string(),
            price_per_unit: Decimal::from_str("9.99").unwrap(),
            quantity_on_hand: quantity,
            product_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn never_inserted_id_is_absent() {
        let store = InMemoryProductStore::new();
        store.insert(product("Widget", "Acme", 1)).await.unwrap();

        assert!(store.get(ProductId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_assigns_unique_positive_ids() {
        let store = InMemoryProductStore::new();
        let first = store.insert(product("Widget", "Acme", 1)).await.unwrap();
        let second = store.insert(product("Gadget", "Acme", 1)).await.unwrap();

        assert!(first.as_i32() > 0);
        assert!(second.as_i32() > 0);
        assert_ne!(first, second);

        let loaded = store.get(first).await.unwrap().unwrap();
        assert_eq!(loaded, product("Widget", "Acme", 1).with_id(first));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_remove() {
        let store = InMemoryProductStore::new();
        let first = store.insert(product("Widget", "Acme", 1)).await.unwrap();
        store.remove(first).await.unwrap();
        let second = store.insert(product("Gadget", "Acme", 1)).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let store = InMemoryProductStore::new();
        let id = store.insert(product("Widget", "Acme", 1)).await.unwrap();

        let changed = product("Widget Pro", "Acme", 40).with_id(id);
        store.update(changed.clone()).await.unwrap();

        assert_eq!(store.get(id).await.unwrap().unwrap(), changed);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let store = InMemoryProductStore::new();
        let result = store
            .update(product("Widget", "Acme", 1).with_id(ProductId::new(5)))
            .await;

        assert!(matches!(result, Err(ProductStoreError::NotFound(id)) if id == ProductId::new(5)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryProductStore::new();
        let id = store.insert(product("Widget", "Acme", 1)).await.unwrap();

        assert!(store.remove(id).await.is_ok());
        assert!(store.remove(id).await.is_ok());
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn top_n_orders_by_quantity_descending() {
        let store = InMemoryProductStore::new();
        for (name, quantity) in [("a", 5), ("b", 50), ("c", 20), ("d", 50)] {
            store.insert(product(name, "Acme", quantity)).await.unwrap();
        }

        let top = store.top_n(3).await.unwrap();
        let names: Vec<_> = top.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c"]);
    }

    #[tokio::test]
    async fn search_matches_case_insensitively_and_lower_cases_results() {
        let store = InMemoryProductStore::new();
        store.insert(product("Widget", "Acme", 1)).await.unwrap();
        store.insert(product("Gizmo", "Zenith", 1)).await.unwrap();

        let found = store
            .search(&ProductFilter::new().manufacturer("ACME"))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].manufacturer, "acme");
        assert_eq!(found[0].product_name, "widget");
    }

    #[tokio::test]
    async fn empty_search_returns_whole_catalog() {
        let store = InMemoryProductStore::new();
        store.insert(product("Widget", "Acme", 1)).await.unwrap();
        store.insert(product("Gizmo", "Zenith", 1)).await.unwrap();

        let found = store.search(&ProductFilter::new()).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let store = InMemoryProductStore::new();
        store.set_latency(Some(Duration::from_secs(5)));

        let search = store.search(&ProductFilter::new()).await;
        assert!(matches!(
            search,
            Err(ProductStoreError::Timeout { operation: "search", limit }) if limit == StoreTimeouts::DEFAULT_REPORT
        ));

        // The crud deadline is longer, so the same latency still completes.
        assert!(store.get(ProductId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failures_are_database_errors() {
        let store = InMemoryProductStore::new();
        store.set_failing(true);

        assert!(matches!(
            store.list().await,
            Err(ProductStoreError::Database(_))
        ));
        assert!(matches!(
            store.insert(product("Widget", "Acme", 1)).await,
            Err(ProductStoreError::Database(_))
        ));
    }
}
