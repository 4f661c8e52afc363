//! Client channel seams.

use async_trait::async_trait;
use common::Product;

use crate::Result;

/// The outbound half of a client connection.
#[async_trait]
pub trait SnapshotSink: Send {
    /// Sends one snapshot to the client.
    async fn push(&mut self, snapshot: &[Product]) -> Result<()>;

    /// Releases the channel. Called exactly once, after the last push.
    async fn close(&mut self) -> Result<()>;
}

/// The inbound half of a client connection.
#[async_trait]
pub trait InboundSource: Send + 'static {
    /// Waits for the next client message.
    ///
    /// Returns None once the client has closed the channel.
    async fn recv(&mut self) -> Option<Result<String>>;
}
