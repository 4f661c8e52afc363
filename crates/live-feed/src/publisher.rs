//! Per-connection snapshot publisher.

use std::time::Duration;

use product_store::ProductStore;

use crate::channel::{InboundSource, SnapshotSink};
use crate::signal::{CloseReason, DoneSignal};

/// Cadence and size of the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    /// Pause between snapshots.
    pub interval: Duration,
    /// Number of products per snapshot.
    pub snapshot_size: usize,
}

impl FeedConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_SNAPSHOT_SIZE: usize = 10;
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            snapshot_size: Self::DEFAULT_SNAPSHOT_SIZE,
        }
    }
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOutcome {
    pub snapshots_pushed: u64,
    pub reason: CloseReason,
}

/// Serves the top-stock snapshot feed to connected clients.
#[derive(Clone)]
pub struct LiveFeed<S: ProductStore> {
    store: S,
    config: FeedConfig,
}

impl<S: ProductStore> LiveFeed<S> {
    /// Creates a feed that polls `store`.
    pub fn new(store: S, config: FeedConfig) -> Self {
        Self { store, config }
    }

    /// Returns the feed configuration.
    pub fn config(&self) -> FeedConfig {
        self.config
    }

    /// Serves one connection until the client leaves or a push or poll fails.
    pub async fn serve<K, R>(&self, sink: K, source: R) -> FeedOutcome
    where
        K: SnapshotSink,
        R: InboundSource,
    {
        self.serve_with_signal(sink, source, DoneSignal::new()).await
    }

    /// Serves one connection, also stopping when `done` is fired from outside.
    ///
    /// The pusher runs on the calling task and the drainer on a spawned one.
    /// The sink is closed once when the pusher exits, and the drainer is
    /// stopped before this returns.
    #[tracing::instrument(skip_all)]
    pub async fn serve_with_signal<K, R>(
        &self,
        mut sink: K,
        source: R,
        done: DoneSignal,
    ) -> FeedOutcome
    where
        K: SnapshotSink,
        R: InboundSource,
    {
        metrics::gauge!("live_feed_connections").increment(1.0);
        tracing::info!("live feed connection opened");

        let drainer = tokio::spawn(drain(source, done.clone()));
        let snapshots_pushed = self.publish(&mut sink, &done).await;

        if let Err(err) = sink.close().await {
            tracing::debug!(error = %err, "closing live feed channel failed");
        }
        drainer.abort();
        let _ = drainer.await;

        metrics::gauge!("live_feed_connections").decrement(1.0);
        let reason = done.reason().unwrap_or(CloseReason::Shutdown);
        tracing::info!(%reason, snapshots_pushed, "live feed connection closed");

        FeedOutcome {
            snapshots_pushed,
            reason,
        }
    }

    async fn publish<K: SnapshotSink>(&self, sink: &mut K, done: &DoneSignal) -> u64 {
        let mut pushed = 0;

        loop {
            let polled = tokio::select! {
                biased;
                _ = done.closed() => break,
                polled = self.store.top_n(self.config.snapshot_size) => polled,
            };

            let snapshot = match polled {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(error = %err, "live feed poll failed");
                    done.close(CloseReason::PollFailed);
                    break;
                }
            };

            // The client may have left while the poll was running.
            if done.is_closed() {
                break;
            }

            if let Err(err) = sink.push(&snapshot).await {
                tracing::warn!(error = %err, "live feed push failed");
                done.close(CloseReason::PushFailed);
                break;
            }
            pushed += 1;
            metrics::counter!("live_feed_snapshots_pushed_total").increment(1);

            tokio::select! {
                _ = done.closed() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        pushed
    }
}

/// Reads and discards client messages until the client goes away.
async fn drain<R: InboundSource>(mut source: R, done: DoneSignal) {
    loop {
        tokio::select! {
            _ = done.closed() => return,
            message = source.recv() => match message {
                Some(Ok(text)) => {
                    tracing::debug!(bytes = text.len(), "live feed message received");
                }
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "live feed receive failed");
                    done.close(CloseReason::ClientError);
                    return;
                }
                None => {
                    done.close(CloseReason::ClientDisconnected);
                    return;
                }
            },
        }
    }
}
