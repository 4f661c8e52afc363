//! HTML product report rendering.

use chrono::{DateTime, Utc};
use common::Product;
use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

/// File name offered to clients downloading a report.
pub const REPORT_FILENAME: &str = "report.html";

const TEMPLATE_NAME: &str = "report";
const REPORT_SOURCE: &str = include_str!("../templates/report.hbs");

/// Failure while producing the report document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template source did not compile.
    #[error("report template is invalid: {0}")]
    Template(String),

    /// The template failed while rendering.
    #[error("failed to render report: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub html: String,
    pub product_count: usize,
}

#[derive(Serialize)]
struct ReportContext<'a> {
    product_count: usize,
    generated_at: String,
    rows: Vec<ReportRow<'a>>,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    shaded: bool,
    product_id: i32,
    product_name: &'a str,
    manufacturer: &'a str,
    sku: &'a str,
    upc: &'a str,
    price: String,
    quantity_on_hand: i32,
}

/// The report layout: one table row per product, every other row shaded.
///
/// The template is compiled once, in strict mode, with handlebars' HTML
/// escaping applied to every product field.
pub struct ReportTemplate {
    registry: Handlebars<'static>,
    compile_error: Option<String>,
}

impl ReportTemplate {
    /// Compiles the built-in report layout.
    pub fn new() -> Self {
        Self::from_source(REPORT_SOURCE)
    }

    /// Compiles a custom layout. A template that fails to compile is
    /// reported by every subsequent [`render`](Self::render).
    pub fn from_source(source: &str) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        let compile_error = registry
            .register_template_string(TEMPLATE_NAME, source)
            .err()
            .map(|err| {
                tracing::error!(error = %err, "report template failed to compile");
                err.to_string()
            });

        Self {
            registry,
            compile_error,
        }
    }

    /// Renders the products into a standalone HTML document.
    pub fn render(
        &self,
        products: &[Product],
        generated_at: DateTime<Utc>,
    ) -> Result<Report, RenderError> {
        if let Some(err) = &self.compile_error {
            return Err(RenderError::Template(err.clone()));
        }

        let context = ReportContext {
            product_count: products.len(),
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            rows: products
                .iter()
                .enumerate()
                .map(|(i, product)| ReportRow {
                    shaded: i % 2 == 1,
                    product_id: product.product_id.as_i32(),
                    product_name: &product.product_name,
                    manufacturer: &product.manufacturer,
                    sku: &product.sku,
                    upc: &product.upc,
                    price: format!("{:.2}", product.price()),
                    quantity_on_hand: product.quantity_on_hand,
                })
                .collect(),
        };

        let html = self.registry.render(TEMPLATE_NAME, &context)?;
        Ok(Report {
            html,
            product_count: products.len(),
        })
    }
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self::new()
    }
}
