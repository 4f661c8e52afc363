//! Live product feed.
//!
//! Each connected client gets a pusher that polls the store for the
//! top-stock snapshot and sends it at a fixed cadence, and a drainer that
//! reads inbound messages only to notice when the client goes away. The two
//! coordinate through a single [`DoneSignal`].

pub mod channel;
pub mod error;
pub mod publisher;
pub mod signal;

pub use channel::{InboundSource, SnapshotSink};
pub use error::{FeedError, Result};
pub use publisher::{FeedConfig, FeedOutcome, LiveFeed};
pub use signal::{CloseReason, DoneSignal};
