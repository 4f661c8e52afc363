use common::{Product, ProductFilter};

/// Columns selected for plain reads, in row-mapping order.
pub const PRODUCT_COLUMNS: &str =
    "product_id, manufacturer, sku, upc, price_per_unit, quantity_on_hand, product_name";

/// Columns selected for filtered searches. Text columns come back lower-cased
/// so callers compare them without caring about the stored case.
pub const SEARCH_COLUMNS: &str = "product_id, LOWER(manufacturer) AS manufacturer, LOWER(sku) AS sku, upc, \
     price_per_unit, quantity_on_hand, LOWER(product_name) AS product_name";

/// A column a report filter can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    ProductName,
    Manufacturer,
    Sku,
}

impl FilterColumn {
    /// Column name in the `products` table.
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterColumn::ProductName => "product_name",
            FilterColumn::Manufacturer => "manufacturer",
            FilterColumn::Sku => "sku",
        }
    }

    fn value_of<'a>(&self, product: &'a Product) -> &'a str {
        match self {
            FilterColumn::ProductName => &product.product_name,
            FilterColumn::Manufacturer => &product.manufacturer,
            FilterColumn::Sku => &product.sku,
        }
    }
}

/// One case-insensitive substring condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: FilterColumn,
    /// The lower-cased text to look for.
    pub needle: String,
}

impl Predicate {
    /// Creates a predicate, lower-casing the needle.
    pub fn contains(column: FilterColumn, needle: &str) -> Self {
        Self {
            column,
            needle: needle.to_lowercase(),
        }
    }

    /// The bound `ILIKE` pattern. LIKE wildcards inside the needle are
    /// escaped so they match literally.
    pub fn pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for ch in self.needle.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// Evaluates the predicate against a product in-process.
    pub fn matches(&self, product: &Product) -> bool {
        self.column
            .value_of(product)
            .to_lowercase()
            .contains(&self.needle)
    }
}

/// A parameterized search query assembled from a [`ProductFilter`].
///
/// Predicates are kept in the fixed order name, manufacturer, SKU, and every
/// value travels as a bind argument. A filter with no populated fields
/// produces the unfiltered projection rather than a dangling `WHERE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    predicates: Vec<Predicate>,
}

impl FilterQuery {
    /// Builds the query, dropping absent and empty filter fields.
    pub fn from_filter(filter: &ProductFilter) -> Self {
        let predicates = [
            (FilterColumn::ProductName, &filter.product_name),
            (FilterColumn::Manufacturer, &filter.manufacturer),
            (FilterColumn::Sku, &filter.sku),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| Predicate::contains(column, v))
        })
        .collect();

        Self { predicates }
    }

    /// The predicates in emission order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns true if the query has no conditions.
    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Renders the conditions joined with `AND`, numbering placeholders from
    /// `$1`. Returns `None` when there is nothing to filter on.
    pub fn where_clause(&self) -> Option<String> {
        if self.predicates.is_empty() {
            return None;
        }
        let conditions: Vec<String> = self
            .predicates
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} ILIKE ${}", p.column.as_sql(), i + 1))
            .collect();
        Some(conditions.join(" AND "))
    }

    /// The complete statement text.
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {SEARCH_COLUMNS} FROM products");
        if let Some(clause) = self.where_clause() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        sql.push_str(" ORDER BY product_id");
        sql
    }

    /// Bind arguments, one per placeholder, in order.
    pub fn args(&self) -> Vec<String> {
        self.predicates.iter().map(Predicate::pattern).collect()
    }

    /// Returns true if the product satisfies every predicate.
    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|p| p.matches(product))
    }
}
