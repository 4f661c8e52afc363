use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    FilterQuery, Product, ProductFilter, ProductId, ProductStoreError, Result,
    query::PRODUCT_COLUMNS,
    store::{ProductStore, StoreTimeouts, with_deadline},
};

/// PostgreSQL-backed product store.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
    timeouts: StoreTimeouts,
}

impl PostgresProductStore {
    /// Creates a new store over a shared pool with the default deadlines.
    pub fn new(pool: PgPool) -> Self {
        Self::with_timeouts(pool, StoreTimeouts::default())
    }

    /// Creates a new store with explicit deadlines.
    pub fn with_timeouts(pool: PgPool, timeouts: StoreTimeouts) -> Self {
        Self { pool, timeouts }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            product_id: ProductId::new(row.try_get("product_id")?),
            manufacturer: row.try_get("manufacturer")?,
            sku: row.try_get("sku")?,
            upc: row.try_get("upc")?,
            price_per_unit: row.try_get("price_per_unit")?,
            quantity_on_hand: row.try_get("quantity_on_hand")?,
            product_name: row.try_get("product_name")?,
        })
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        with_deadline("get", self.timeouts.crud, async {
            let row: Option<PgRow> = sqlx::query(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
            ))
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

            row.map(Self::row_to_product).transpose()
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>> {
        with_deadline("list", self.timeouts.crud, async {
            let rows = sqlx::query(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
            ))
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter().map(Self::row_to_product).collect()
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn top_n(&self, n: usize) -> Result<Vec<Product>> {
        with_deadline("top_n", self.timeouts.report, async {
            let rows = sqlx::query(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products \
                 ORDER BY quantity_on_hand DESC, product_id ASC LIMIT $1"
            ))
            .bind(i64::try_from(n).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter().map(Self::row_to_product).collect()
        })
        .await
    }

    #[tracing::instrument(skip(self, product), fields(sku = %product.sku))]
    async fn insert(&self, product: Product) -> Result<ProductId> {
        with_deadline("insert", self.timeouts.crud, async {
            let id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO products (manufacturer, sku, upc, price_per_unit, quantity_on_hand, product_name)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING product_id
                "#,
            )
            .bind(&product.manufacturer)
            .bind(&product.sku)
            .bind(&product.upc)
            .bind(product.price())
            .bind(product.quantity_on_hand)
            .bind(&product.product_name)
            .fetch_one(&self.pool)
            .await?;

            Ok(ProductId::new(id))
        })
        .await
    }

    #[tracing::instrument(skip(self, product), fields(id = %product.product_id))]
    async fn update(&self, product: Product) -> Result<()> {
        with_deadline("update", self.timeouts.crud, async {
            let result = sqlx::query(
                r#"
                UPDATE products SET
                    manufacturer = $1,
                    sku = $2,
                    upc = $3,
                    price_per_unit = $4,
                    quantity_on_hand = $5,
                    product_name = $6
                WHERE product_id = $7
                "#,
            )
            .bind(&product.manufacturer)
            .bind(&product.sku)
            .bind(&product.upc)
            .bind(product.price())
            .bind(product.quantity_on_hand)
            .bind(&product.product_name)
            .bind(product.product_id.as_i32())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(ProductStoreError::NotFound(product.product_id));
            }
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, id: ProductId) -> Result<()> {
        with_deadline("remove", self.timeouts.crud, async {
            sqlx::query("DELETE FROM products WHERE product_id = $1")
                .bind(id.as_i32())
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let query = FilterQuery::from_filter(filter);
        let sql = query.sql();

        with_deadline("search", self.timeouts.report, async {
            let mut sqlx_query = sqlx::query(&sql);
            for arg in query.args() {
                sqlx_query = sqlx_query.bind(arg);
            }

            let rows = sqlx_query.fetch_all(&self.pool).await?;
            rows.into_iter().map(Self::row_to_product).collect()
        })
        .await
    }
}
