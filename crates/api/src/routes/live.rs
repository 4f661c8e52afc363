//! Websocket adapter for the live top-stock feed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use common::Product;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use live_feed::{FeedError, InboundSource, SnapshotSink};
use product_store::ProductStore;

use crate::AppState;

/// GET /websocket — upgrades the connection and serves the live feed on it.
pub async fn connect<S: ProductStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let (sink, source) = socket.split();
        state
            .feed
            .serve(WebSocketSink(sink), WebSocketSource(source))
            .await;
    })
}

/// Outbound half of a websocket, sending each snapshot as a JSON text frame.
pub struct WebSocketSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl SnapshotSink for WebSocketSink {
    async fn push(&mut self, snapshot: &[Product]) -> live_feed::Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.0
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| FeedError::Channel(e.to_string()))
    }

    async fn close(&mut self) -> live_feed::Result<()> {
        self.0
            .close()
            .await
            .map_err(|e| FeedError::Channel(e.to_string()))
    }
}

/// Inbound half of a websocket.
///
/// Control frames are skipped; a close frame ends the stream.
pub struct WebSocketSource(SplitStream<WebSocket>);

#[async_trait]
impl InboundSource for WebSocketSource {
    async fn recv(&mut self) -> Option<live_feed::Result<String>> {
        loop {
            let message = match self.0.next().await? {
                Ok(message) => message,
                Err(err) => return Some(Err(FeedError::Channel(err.to_string()))),
            };
            match message {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => return None,
            }
        }
    }
}
