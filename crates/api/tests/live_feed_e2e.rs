//! Live feed over a real websocket connection.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{Decimal, Product, ProductFilter, ProductId};
use futures_util::{SinkExt, StreamExt};
use live_feed::FeedConfig;
use product_store::{InMemoryProductStore, ProductStore};
use tokio_tungstenite::tungstenite::Message;

const INTERVAL: Duration = Duration::from_millis(200);

/// Store that counts snapshot polls.
#[derive(Clone)]
struct CountingStore {
    inner: InMemoryProductStore,
    polls: Arc<AtomicUsize>,
}

#[async_trait]
impl ProductStore for CountingStore {
    async fn get(&self, id: ProductId) -> product_store::Result<Option<Product>> {
        self.inner.get(id).await
    }

    async fn list(&self) -> product_store::Result<Vec<Product>> {
        self.inner.list().await
    }

    async fn top_n(&self, n: usize) -> product_store::Result<Vec<Product>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.inner.top_n(n).await
    }

    async fn insert(&self, product: Product) -> product_store::Result<ProductId> {
        self.inner.insert(product).await
    }

    async fn update(&self, product: Product) -> product_store::Result<()> {
        self.inner.update(product).await
    }

    async fn remove(&self, id: ProductId) -> product_store::Result<()> {
        self.inner.remove(id).await
    }

    async fn search(&self, filter: &ProductFilter) -> product_store::Result<Vec<Product>> {
        self.inner.search(filter).await
    }
}

async fn start_server(store: CountingStore) -> (String, tempfile::TempDir) {
    let receipts = tempfile::tempdir().unwrap();
    let feed = FeedConfig {
        interval: INTERVAL,
        ..FeedConfig::default()
    };
    let state = api::create_state(store, feed, receipts.path());
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let app = api::create_app(state, handle);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{addr}/websocket"), receipts)
}

async fn seeded_store(count: i32) -> CountingStore {
    let inner = InMemoryProductStore::new();
    for i in 0..count {
        inner
            .insert(Product {
                product_id: ProductId::UNASSIGNED,
                manufacturer: "Acme".to_string(),
                sku: format!("SKU-{i}"),
                upc: "000".to_string(),
                price_per_unit: Decimal::from_str("2.50").unwrap(),
                quantity_on_hand: i,
                product_name: format!("Product {i}"),
            })
            .await
            .unwrap();
    }
    CountingStore {
        inner,
        polls: Arc::new(AtomicUsize::new(0)),
    }
}

#[tokio::test]
async fn client_receives_snapshots_until_it_disconnects() {
    let store = seeded_store(12).await;
    let polls = store.polls.clone();
    let (url, _receipts) = start_server(store).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();

    let mut snapshots = Vec::new();
    while snapshots.len() < 3 {
        let message = tokio::time::timeout(INTERVAL * 5, ws.next())
            .await
            .expect("snapshot within a few intervals")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = message {
            let snapshot: Vec<Product> = serde_json::from_str(text.as_str()).unwrap();
            snapshots.push(snapshot);
        }
    }

    assert!(snapshots.iter().all(|s| s.len() == 10));
    assert_eq!(snapshots[0][0].quantity_on_hand, 11);

    // Client chatter is accepted and ignored.
    ws.send(Message::Text("hello".into())).await.unwrap();

    ws.close(None).await.unwrap();
    drop(ws);

    tokio::time::sleep(INTERVAL * 2).await;
    let after_disconnect = polls.load(Ordering::SeqCst);
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(polls.load(Ordering::SeqCst), after_disconnect);
}

#[tokio::test]
async fn each_connection_gets_its_own_feed() {
    let store = seeded_store(2).await;
    let (url, _receipts) = start_server(store).await;

    let (mut first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
    let (mut second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();

    for ws in [&mut first, &mut second] {
        let message = tokio::time::timeout(INTERVAL * 5, ws.next())
            .await
            .expect("snapshot within a few intervals")
            .unwrap()
            .unwrap();
        let snapshot: Vec<Product> = serde_json::from_str(message.to_text().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    first.close(None).await.unwrap();

    // The remaining client keeps receiving.
    let message = tokio::time::timeout(INTERVAL * 5, second.next())
        .await
        .expect("snapshot within a few intervals")
        .unwrap()
        .unwrap();
    assert!(message.is_text());
}
