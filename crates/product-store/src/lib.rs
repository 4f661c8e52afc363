pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{Product, ProductFilter, ProductId};
pub use error::{ProductStoreError, Result};
pub use memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use query::{FilterQuery, Predicate};
pub use store::{ProductStore, StoreTimeouts};
