//! Product service providing the validated API over a product store.

use chrono::Utc;
use common::{Decimal, Product, ProductFilter, ProductId};
use product_store::ProductStore;

use crate::error::{CatalogError, Result, ValidationError};
use crate::report::{Report, ReportTemplate};

/// Service for managing catalog products.
///
/// Identifier and field rules are checked here, so a rejected request never
/// reaches the store. Store errors come back classified as
/// [`CatalogError::Timeout`] or [`CatalogError::Infrastructure`].
pub struct ProductService<S: ProductStore> {
    store: S,
    template: ReportTemplate,
}

impl<S: ProductStore> ProductService<S> {
    /// Creates a new product service over the given store.
    pub fn new(store: S) -> Self {
        Self::with_template(store, ReportTemplate::new())
    }

    /// Creates a product service that renders reports with `template`.
    pub fn with_template(store: S, template: ReportTemplate) -> Self {
        Self { store, template }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads one product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store
            .get(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Loads the whole catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.store.list().await?)
    }

    /// Creates a product and returns its store-assigned id.
    ///
    /// The payload must not carry an id of its own.
    #[tracing::instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn create_product(&self, product: Product) -> Result<ProductId> {
        if product.product_id.is_assigned() {
            return Err(ValidationError::IdOnCreate(product.product_id).into());
        }
        validate_fields(&product)?;

        let id = self.store.insert(product).await?;
        metrics::counter!("catalog_products_created_total").increment(1);
        tracing::info!(%id, "product created");
        Ok(id)
    }

    /// Replaces the product addressed by `id`.
    ///
    /// The payload id must equal the addressed id.
    #[tracing::instrument(skip(self, product))]
    pub async fn update_product(&self, id: ProductId, product: Product) -> Result<()> {
        if product.product_id != id {
            return Err(ValidationError::IdMismatch {
                path: id,
                body: product.product_id,
            }
            .into());
        }
        validate_fields(&product)?;

        self.store.update(product).await?;
        Ok(())
    }

    /// Deletes a product. Deleting a missing product succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.store.remove(id).await?;
        Ok(())
    }

    /// Renders a report of the products matching `filter`.
    ///
    /// An empty filter reports on the whole catalog. A filter that matches
    /// nothing yields [`CatalogError::NoMatches`] rather than an empty table.
    #[tracing::instrument(skip(self))]
    pub async fn generate_report(&self, filter: &ProductFilter) -> Result<Report> {
        let products = self.store.search(filter).await?;
        if products.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        let report = self.template.render(&products, Utc::now())?;
        tracing::info!(products = report.product_count, "report rendered");
        Ok(report)
    }
}

fn validate_fields(product: &Product) -> std::result::Result<(), ValidationError> {
    if product.quantity_on_hand < 0 {
        return Err(ValidationError::NegativeQuantity(product.quantity_on_hand));
    }
    if product.price_per_unit < Decimal::ZERO {
        return Err(ValidationError::NegativePrice(product.price_per_unit));
    }
    Ok(())
}
