//! In-process transport: the other end is driven directly by the caller.

use serde_json::Value;
use tokio::sync::mpsc;

use super::{Frame, Link};

/// Creates a connected pair: the [`Link`] for a session and the [`Remote`]
/// standing in for the backend.
pub fn pair() -> (Link, Remote) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    (
        Link::new(out_tx, in_rx),
        Remote {
            to_client: Some(in_tx),
            from_client: out_rx,
        },
    )
}

/// Backend side of a loopback pair.
#[derive(Debug)]
pub struct Remote {
    to_client: Option<mpsc::UnboundedSender<Frame>>,
    from_client: mpsc::UnboundedReceiver<Frame>,
}

impl Remote {
    /// Delivers an event to the client. Returns `false` once disconnected.
    pub fn push(&self, event: &str, data: Value) -> bool {
        self.to_client
            .as_ref()
            .is_some_and(|tx| tx.send(Frame::new(event, data)).is_ok())
    }

    /// Next frame the client sent, waiting for it. `None` once the client closed.
    pub async fn next(&mut self) -> Option<Frame> {
        self.from_client.recv().await
    }

    pub fn try_next(&mut self) -> Option<Frame> {
        self.from_client.try_recv().ok()
    }

    /// Every frame sent so far.
    pub fn drain(&mut self) -> Vec<Frame> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Names of every event sent so far.
    pub fn drain_events(&mut self) -> Vec<String> {
        self.drain().into_iter().map(|f| f.event).collect()
    }

    /// Whether the client dropped its end.
    pub fn is_closed(&self) -> bool {
        self.from_client.is_closed()
    }

    /// Drops the backend-to-client direction, as a lost connection would.
    pub fn disconnect(&mut self) {
        self.to_client = None;
    }
}
