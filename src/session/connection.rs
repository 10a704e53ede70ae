//! The live connection of one chat view.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handlers::{Handler, HandlerRegistry};
use crate::domain::Identity;
use crate::error::PreconditionError;
use crate::transport::{Frame, Link, events};

/// Connection lifecycle as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Transport is up and `setup` was sent; waiting for `connected`.
    Connecting,
    /// Backend acknowledged `setup`; sends are allowed.
    Connected,
}

/// One live real-time connection, scoped to the view that opened it.
///
/// Closing (explicitly or by drop) stops dispatch, drops every handler and
/// closes the transport.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    identity: Identity,
    outbound: Option<mpsc::UnboundedSender<Frame>>,
    handlers: HandlerRegistry,
    state: Arc<watch::Sender<ConnectionState>>,
    shutdown: CancellationToken,
}

impl Session {
    /// Takes ownership of a connected link, sends `setup` and starts dispatching.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(link: Link, identity: Identity) -> Self {
        let Link { outbound, inbound } = link;
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let session = Self {
            id: Uuid::new_v4(),
            identity,
            outbound: Some(outbound),
            handlers: HandlerRegistry::new(),
            state: Arc::new(state),
            shutdown: CancellationToken::new(),
        };

        info!(
            name: "chat.session.opening",
            session_id = %session.id,
            user_id = %session.identity.user.id,
            "Opening real-time session"
        );

        tokio::spawn(dispatch(
            session.id,
            inbound,
            session.handlers.clone(),
            Arc::clone(&session.state),
            session.shutdown.clone(),
        ));

        session.emit(events::SETUP, &session.identity.user);
        session
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Fails with [`PreconditionError::NotConnected`] unless acknowledged.
    pub fn require_connected(&self) -> Result<(), PreconditionError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(PreconditionError::NotConnected)
        }
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Waits up to `timeout` for the `connected` acknowledgment.
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        matches!(
            tokio::time::timeout(timeout, rx.wait_for(|s| *s == ConnectionState::Connected)).await,
            Ok(Ok(_))
        )
    }

    /// Sends a named event. Fire-and-forget: failures are logged, not returned.
    ///
    /// Callers check [`Session::is_connected`] first for send-dependent events.
    pub fn emit<T: Serialize + ?Sized>(&self, event: &str, payload: &T) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!(name: "chat.session.encode_failed", session_id = %self.id, event = %event, error = %e, "Dropping event");
                return;
            }
        };
        let Some(outbound) = &self.outbound else {
            debug!(name: "chat.session.emit_after_close", session_id = %self.id, event = %event, "Session closed, event dropped");
            return;
        };
        if outbound.send(Frame::new(event, data)).is_err() {
            warn!(name: "chat.session.emit_failed", session_id = %self.id, event = %event, "Transport gone, event dropped");
        } else {
            debug!(name: "chat.session.emitted", session_id = %self.id, event = %event, "Event emitted");
        }
    }

    /// Installs the handler for `event`, replacing any previous one.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        if self.handlers.set(event, handler) {
            debug!(name: "chat.session.handler_replaced", session_id = %self.id, event = %event, "Handler replaced");
        }
    }

    /// Removes the handler for `event`, if any.
    pub fn off(&self, event: &str) {
        self.handlers.remove(event);
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Tears the session down. Safe to call more than once.
    pub fn close(&mut self) {
        if self.outbound.is_none() {
            return;
        }
        self.shutdown.cancel();
        self.handlers.clear();
        self.outbound = None;
        self.state.send_replace(ConnectionState::Disconnected);
        info!(name: "chat.session.closed", session_id = %self.id, "Real-time session closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbound.is_none()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

async fn dispatch(
    session_id: Uuid,
    mut inbound: mpsc::UnboundedReceiver<Frame>,
    handlers: HandlerRegistry,
    state: Arc<watch::Sender<ConnectionState>>,
    shutdown: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            () = shutdown.cancelled() => return,
            frame = inbound.recv() => frame,
        };

        let Some(Frame { event, data }) = frame else {
            state.send_replace(ConnectionState::Disconnected);
            warn!(name: "chat.session.connection_lost", session_id = %session_id, "Real-time connection lost");
            return;
        };

        if event == events::CONNECTED {
            let previous = state.send_replace(ConnectionState::Connected);
            if previous != ConnectionState::Connected {
                info!(name: "chat.session.connected", session_id = %session_id, "Real-time session connected");
            }
        }

        match handlers.get(&event) {
            Some(handler) => handler(data),
            None => debug!(name: "chat.session.unhandled", session_id = %session_id, event = %event, "No handler for event"),
        }
    }
}
