//! Shared types for the inventory service: the product entity, its identifier
//! and the report filter.

pub mod filter;
pub mod product;
pub mod types;

pub use filter::ProductFilter;
pub use product::{PRICE_SCALE, Product, round_price};
pub use rust_decimal::Decimal;
pub use types::ProductId;
