pub mod health;
pub mod live;
pub mod metrics;
pub mod products;
pub mod receipts;
pub mod reports;
