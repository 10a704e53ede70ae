//! Chatline
//!
//! Client side of a real-time chat: one socket session per chat view, scoped
//! to the selected conversation, with message history and sends over HTTP.
//!
//! # Architecture
//!
//! - **Transport**: JSON event frames over WebSocket (or an in-process loopback)
//! - **Session**: `setup` handshake, connection state, event handler registry
//! - **View**: conversation binding, message store, typing debounce and
//!   unread routing, owned by one task per open view
//! - **API**: bearer-authenticated history fetch and message post
//!
//! # Modules
//!
//! - [`api`]: HTTP message backend
//! - [`binding`]: active conversation and join/leave scoping
//! - [`config`]: layered client configuration
//! - [`domain`]: users, conversations, messages
//! - [`notify`]: unread notification routing
//! - [`session`]: real-time session lifecycle
//! - [`store`]: message list of the active conversation
//! - [`transport`]: wire frames and transports
//! - [`typing`]: typing indicator debounce
//! - [`view`]: the chat view tying everything together

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod binding;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod session;
pub mod store;
pub mod transport;
pub mod typing;
pub mod view;

pub use error::{Error, Result};
pub use view::{ChatView, Notice, ViewOptions, ViewUpdate};
