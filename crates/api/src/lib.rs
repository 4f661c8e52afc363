//! HTTP API server for the inventory service.
//!
//! Provides REST endpoints for the product catalog, filtered reports and
//! receipt files, plus the live top-stock websocket feed, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod receipts;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use catalog::ProductService;
use live_feed::{FeedConfig, LiveFeed};
use metrics_exporter_prometheus::PrometheusHandle;
use product_store::ProductStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use receipts::{MAX_RECEIPT_BYTES, ReceiptStore};

/// Shared application state accessible from all handlers.
pub struct AppState<S: ProductStore> {
    pub products: ProductService<S>,
    pub feed: LiveFeed<S>,
    pub receipts: ReceiptStore,
}

/// Creates the application state over one product store.
pub fn create_state<S: ProductStore + Clone + 'static>(
    store: S,
    feed: FeedConfig,
    receipt_dir: impl Into<PathBuf>,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        products: ProductService::new(store.clone()),
        feed: LiveFeed::new(store, feed),
        receipts: ReceiptStore::new(receipt_dir),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ProductStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route("/products/reports", post(routes::reports::generate::<S>))
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route(
            "/receipts",
            get(routes::receipts::list::<S>).post(routes::receipts::upload::<S>),
        )
        .route("/receipts/{name}", get(routes::receipts::download::<S>))
        .layer(DefaultBodyLimit::max(MAX_RECEIPT_BYTES));

    Router::new()
        .nest("/api", api)
        .route("/websocket", get(routes::live::connect::<S>))
        .route("/health", get(routes::health::check))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
