//! Real-time session management.
//!
//! A [`Session`] owns the one live connection of a chat view: it performs the
//! `setup` handshake, tracks [`ConnectionState`], emits outbound events and
//! dispatches inbound events to at most one handler per event name.
//!
//! # Architecture
//!
//! - [`Session`]: connection lifecycle, emit, subscription management
//! - [`HandlerRegistry`]: event name to handler map with replace semantics
//!
//! # Example
//!
//! ```rust
//! use chatline::domain::{Identity, User};
//! use chatline::session::{ConnectionState, Session};
//! use chatline::transport::{events, loopback};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (link, remote) = loopback::pair();
//! let session = Session::open(link, Identity::new(User::new("u1", "Ana"), "token"));
//! assert_eq!(session.state(), ConnectionState::Connecting);
//!
//! remote.push(events::CONNECTED, serde_json::Value::Null);
//! assert!(session.wait_connected(std::time::Duration::from_secs(1)).await);
//! # }
//! ```

mod connection;
mod handlers;

pub use connection::{ConnectionState, Session};
pub use handlers::{Handler, HandlerRegistry};
