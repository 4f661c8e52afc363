//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency and truncate
//! the table between tests, so they run serially.
//!
//! ```bash
//! cargo test -p product-store --test postgres_integration
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use common::Decimal;
use product_store::{
    PostgresProductStore, Product, ProductFilter, ProductId, ProductStore, ProductStoreError,
    StoreTimeouts,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresProductStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an empty table
async fn get_test_store() -> PostgresProductStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresProductStore::new(pool)
}

fn product(name: &str, manufacturer: &str, sku: &str, quantity: i32) -> Product {
    Product {
        product_id: ProductId::UNASSIGNED,
        manufacturer: manufacturer.to_string(),
        sku: sku.to_string(),
        upc: "000".to_string(),
        price_per_unit: Decimal::from_str("9.99").unwrap(),
        quantity_on_hand: quantity,
        product_name: name.to_string(),
    }
}

#[tokio::test]
#[serial]
async fn insert_and_get_round_trip() {
    let store = get_test_store().await;

    let id = store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();
    assert!(id.as_i32() > 0);

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded, product("Widget", "Acme", "A1", 5).with_id(id));
}

#[tokio::test]
#[serial]
async fn get_missing_is_absent_not_error() {
    let store = get_test_store().await;
    assert!(store.get(ProductId::new(4242)).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn price_is_stored_with_two_decimal_places() {
    let store = get_test_store().await;

    let mut priced = product("Widget", "Acme", "A1", 5);
    priced.price_per_unit = Decimal::from_str("10.555").unwrap();
    let id = store.insert(priced).await.unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.price_per_unit, Decimal::from_str("10.56").unwrap());
}

#[tokio::test]
#[serial]
async fn update_existing_and_missing() {
    let store = get_test_store().await;
    let id = store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();

    let changed = product("Widget Pro", "Acme", "A2", 8).with_id(id);
    store.update(changed.clone()).await.unwrap();
    assert_eq!(store.get(id).await.unwrap().unwrap(), changed);

    let missing = product("Ghost", "Acme", "G1", 1).with_id(ProductId::new(9999));
    let result = store.update(missing).await;
    assert!(matches!(result, Err(ProductStoreError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn remove_twice_succeeds() {
    let store = get_test_store().await;
    let id = store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();

    store.remove(id).await.unwrap();
    store.remove(id).await.unwrap();
    assert!(store.get(id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn list_and_top_n() {
    let store = get_test_store().await;
    for (i, quantity) in [3, 30, 12, 7].into_iter().enumerate() {
        store
            .insert(product(&format!("P{i}"), "Acme", &format!("S{i}"), quantity))
            .await
            .unwrap();
    }

    assert_eq!(store.list().await.unwrap().len(), 4);

    let top = store.top_n(2).await.unwrap();
    let quantities: Vec<_> = top.iter().map(|p| p.quantity_on_hand).collect();
    assert_eq!(quantities, vec![30, 12]);
}

#[tokio::test]
#[serial]
async fn search_by_manufacturer_ignores_stored_case() {
    let store = get_test_store().await;
    store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();
    store
        .insert(product("Sprocket", "ACME Industrial", "A2", 5))
        .await
        .unwrap();
    store
        .insert(product("Gizmo", "Zenith", "Z1", 5))
        .await
        .unwrap();

    let found = store
        .search(&ProductFilter::new().manufacturer("acme"))
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.manufacturer.contains("acme")));
}

#[tokio::test]
#[serial]
async fn search_with_all_predicates_and_wildcards() {
    let store = get_test_store().await;
    store
        .insert(product("Widget 100%", "Acme", "A_1", 5))
        .await
        .unwrap();
    store
        .insert(product("Widget 1000", "Acme", "AB1", 5))
        .await
        .unwrap();

    let found = store
        .search(
            &ProductFilter::new()
                .product_name("widget 100%")
                .manufacturer("ac")
                .sku("a_"),
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].product_name, "widget 100%");
    assert_eq!(found[0].sku, "a_1");
}

#[tokio::test]
#[serial]
async fn empty_search_returns_whole_catalog() {
    let store = get_test_store().await;
    store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();
    store
        .insert(product("Gizmo", "Zenith", "Z1", 5))
        .await
        .unwrap();

    let found = store.search(&ProductFilter::new()).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
#[serial]
async fn deadline_expiry_surfaces_as_timeout() {
    let store = get_test_store().await;
    let slow = PostgresProductStore::with_timeouts(
        store.pool().clone(),
        StoreTimeouts::uniform(Duration::from_millis(50)),
    );

    // Hold a row lock so the update blocks past its deadline.
    let id = store
        .insert(product("Widget", "Acme", "A1", 5))
        .await
        .unwrap();
    let mut tx = store.pool().begin().await.unwrap();
    sqlx::query("SELECT product_id FROM products WHERE product_id = $1 FOR UPDATE")
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await
        .unwrap();

    let result = slow.update(product("Widget", "Acme", "A1", 6).with_id(id)).await;
    assert!(matches!(
        result,
        Err(ProductStoreError::Timeout {
            operation: "update",
            ..
        })
    ));

    tx.rollback().await.unwrap();
}
