use serde::{Deserialize, Serialize};

/// Optional substring filters for a product report.
///
/// Each populated field narrows the result to products whose matching column
/// contains the text, ignoring case. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    pub product_name: Option<String>,
    pub manufacturer: Option<String>,
    pub sku: Option<String>,
}

impl ProductFilter {
    /// Creates an empty filter that matches every product.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by product name.
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Filters by manufacturer.
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Filters by SKU.
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Returns true if no field carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        [&self.product_name, &self.manufacturer, &self.sku]
            .into_iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}
