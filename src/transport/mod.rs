//! Real-time channel plumbing.
//!
//! A transport carries named events as JSON text frames of the form
//! `{"event": "<name>", "data": <payload>}`. Whatever the underlying
//! connection, it is handed to the session as a [`Link`]: an outbound
//! frame sender and an inbound frame receiver. Dropping the outbound
//! sender closes the connection.
//!
//! - [`ws`]: WebSocket client (`tokio-tungstenite`)
//! - [`loopback`]: in-process pair, for embedding and tests

pub mod loopback;
pub mod ws;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// Event names exchanged with the chat backend.
pub mod events {
    /// Outbound handshake carrying the current user.
    pub const SETUP: &str = "setup";
    /// Inbound acknowledgment of `setup`.
    pub const CONNECTED: &str = "connected";
    pub const JOIN_CHAT: &str = "join chat";
    pub const LEAVE_CHAT: &str = "leave chat";
    /// Both directions: outbound carries the conversation id, inbound is a peer signal.
    pub const TYPING: &str = "typing";
    pub const STOP_TYPING: &str = "stop typing";
    /// Outbound relay of a message the backend just created.
    pub const NEW_MESSAGE: &str = "new message";
    pub const MESSAGE_RECEIVED: &str = "message received";
}

/// One named event on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Both directions of a live connection.
#[derive(Debug)]
pub struct Link {
    pub(crate) outbound: mpsc::UnboundedSender<Frame>,
    pub(crate) inbound: mpsc::UnboundedReceiver<Frame>,
}

impl Link {
    pub fn new(
        outbound: mpsc::UnboundedSender<Frame>,
        inbound: mpsc::UnboundedReceiver<Frame>,
    ) -> Self {
        Self { outbound, inbound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_wire_shape() {
        let frame = Frame::new(events::JOIN_CHAT, json!("c1"));
        let text = frame.encode().unwrap();
        assert_eq!(text, r#"{"event":"join chat","data":"c1"}"#);
        assert_eq!(Frame::decode(&text).unwrap(), frame);
    }

    #[test]
    fn test_frame_without_data() {
        let frame = Frame::decode(r#"{"event":"connected"}"#).unwrap();
        assert_eq!(frame.event, events::CONNECTED);
        assert!(frame.data.is_null());
    }
}
