//! Product service for the inventory system.
//!
//! This crate sits between the HTTP shell and the product store:
//! - validates identifier and field rules before anything reaches the store
//! - classifies store outcomes (absent, timeout, infrastructure failure)
//! - renders filtered HTML reports

pub mod error;
pub mod report;
pub mod service;

pub use error::{CatalogError, Result, ValidationError};
pub use report::{REPORT_FILENAME, RenderError, Report, ReportTemplate};
pub use service::ProductService;
