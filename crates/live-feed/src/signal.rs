//! Single-fire termination signal shared by a connection's tasks.

use std::sync::Arc;

use tokio::sync::watch;

/// Why a feed connection closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client ended the stream.
    ClientDisconnected,
    /// Reading from the client failed.
    ClientError,
    /// Sending a snapshot failed.
    PushFailed,
    /// Polling the store failed.
    PollFailed,
    /// The server stopped the feed.
    Shutdown,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CloseReason::ClientDisconnected => "client disconnected",
            CloseReason::ClientError => "client error",
            CloseReason::PushFailed => "push failed",
            CloseReason::PollFailed => "poll failed",
            CloseReason::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Done-signal for one connection.
///
/// Clones share the same state. The signal fires at most once; the first
/// reason recorded wins, and every clone can observe it without consuming it.
#[derive(Debug, Clone)]
pub struct DoneSignal {
    state: Arc<watch::Sender<Option<CloseReason>>>,
}

impl DoneSignal {
    /// Creates an open signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Fires the signal. Returns true if this call fired it, false if it had
    /// already fired.
    pub fn close(&self, reason: CloseReason) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(reason);
            true
        })
    }

    /// Returns true once the signal has fired.
    pub fn is_closed(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// The reason recorded by the call that fired the signal.
    pub fn reason(&self) -> Option<CloseReason> {
        *self.state.borrow()
    }

    /// Waits until the signal fires. Returns immediately if it already has.
    pub async fn closed(&self) -> CloseReason {
        let mut rx = self.state.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(state) => (*state).unwrap_or(CloseReason::Shutdown),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Err(_) => CloseReason::Shutdown,
        }
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}
