//! The chat view: everything one open conversation screen owns.
//!
//! [`ChatView`] is built on mount and torn down on drop. It owns the
//! [`Session`], the [`ConversationBinding`], the [`MessageStore`], the
//! [`TypingController`] and the [`NotificationRouter`], and is driven from a
//! single task:
//!
//! - user actions: [`ChatView::select_conversation`], [`ChatView::input`],
//!   [`ChatView::submit`] / [`ChatView::send_message`]
//! - socket events and the typing deadline: [`ChatView::process_next`]
//!
//! Results for the presentation layer come out as [`ViewUpdate`]s on the
//! channel returned by [`ChatView::mount`].

mod notice;

pub use notice::{Notice, Severity};

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{MessageBackend, PostedMessage};
use crate::binding::ConversationBinding;
use crate::config::ClientConfig;
use crate::domain::{Conversation, ConversationId, Identity, Message};
use crate::error::{Error, FetchError, PreconditionError, Result, SendError};
use crate::notify::{NotificationRouter, Routed};
use crate::session::{ConnectionState, Session};
use crate::store::MessageStore;
use crate::transport::{Link, events};
use crate::typing::{DEFAULT_QUIET_PERIOD, TypingController, TypingSignal};

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    /// Show a toast.
    Notice(Notice),
    /// A message for another conversation arrived; refresh the conversation list.
    RefreshConversations,
    /// The other side started or stopped typing.
    PeerTyping(bool),
    /// History for the active conversation replaced the message list.
    HistoryLoaded {
        conversation_id: ConversationId,
        count: usize,
    },
    /// A message was appended to the active conversation.
    MessageAppended(Message),
    /// The real-time session was acknowledged, or lost.
    Connection(ConnectionState),
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub quiet_period: Duration,
    pub emit_leave_on_switch: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            emit_leave_on_switch: false,
        }
    }
}

impl From<&ClientConfig> for ViewOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            quiet_period: config.typing.quiet_period(),
            emit_leave_on_switch: config.binding.emit_leave_on_switch,
        }
    }
}

/// Socket events forwarded from session handlers to the view's task.
#[derive(Debug)]
enum Inbound {
    PeerTyping(bool),
    Message(Message),
}

#[derive(Debug)]
pub struct ChatView<B> {
    session: Session,
    binding: ConversationBinding,
    store: MessageStore,
    typing: TypingController,
    notifications: NotificationRouter,
    backend: B,
    inbox: mpsc::UnboundedReceiver<Inbound>,
    connection: watch::Receiver<ConnectionState>,
    updates: mpsc::UnboundedSender<ViewUpdate>,
    draft: String,
    peer_typing: bool,
    loading: bool,
}

impl<B: MessageBackend> ChatView<B> {
    /// Opens the session over `link` and installs the socket handlers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        link: Link,
        identity: Identity,
        backend: B,
        options: ViewOptions,
    ) -> (Self, mpsc::UnboundedReceiver<ViewUpdate>) {
        let session = Session::open(link, identity);
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let (updates, updates_rx) = mpsc::unbounded_channel();

        install_handlers(&session, &inbox_tx);
        let connection = session.watch_state();

        let view = Self {
            session,
            binding: ConversationBinding::new(options.emit_leave_on_switch),
            store: MessageStore::new(),
            typing: TypingController::new(options.quiet_period),
            notifications: NotificationRouter::new(),
            backend,
            inbox,
            connection,
            updates,
            draft: String::new(),
            peer_typing: false,
            loading: false,
        };
        (view, updates_rx)
    }

    /// Changes the active conversation, joins it and loads its history.
    ///
    /// `None` deselects and empties the message list.
    pub async fn select_conversation(
        &mut self,
        conversation: Option<Conversation>,
    ) -> std::result::Result<(), FetchError> {
        self.stop_typing();

        let switch = self.binding.select(conversation);
        self.binding.apply(&self.session, &switch);
        self.set_peer_typing(false);

        let Some(current) = switch.current else {
            self.store.clear();
            return Ok(());
        };

        let cleared = self.notifications.take(&current);
        if !cleared.is_empty() {
            debug!(name: "chat.view.notifications_read", conversation_id = %current, count = cleared.len(), "Notifications read");
        }

        self.load_history().await
    }

    /// Replaces the message list with the active conversation's history.
    ///
    /// On failure the list is left as it was and a notice is raised.
    pub async fn load_history(&mut self) -> std::result::Result<(), FetchError> {
        let Some(conversation_id) = self.binding.active_id().cloned() else {
            return Ok(());
        };

        self.loading = true;
        let result = self
            .backend
            .fetch_history(&conversation_id, &self.session.identity().token)
            .await;
        self.loading = false;

        match result {
            Ok(history) => {
                self.store.replace(history);
                info!(
                    name: "chat.view.history_loaded",
                    conversation_id = %conversation_id,
                    count = self.store.len(),
                    "History loaded"
                );
                self.publish(ViewUpdate::HistoryLoaded {
                    conversation_id,
                    count: self.store.len(),
                });
                Ok(())
            }
            Err(source) => {
                let err = FetchError {
                    conversation_id,
                    source,
                };
                warn!(name: "chat.view.history_failed", error = %err, cause = %err.source, "History load failed");
                self.publish(ViewUpdate::Notice((&err).into()));
                Err(err)
            }
        }
    }

    /// Records the draft text and drives the local typing indicator.
    ///
    /// Typing signals need a connected session and a selected conversation.
    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.keystroke(Instant::now());
    }

    fn keystroke(&mut self, now: Instant) {
        if !self.session.is_connected() {
            return;
        }
        let Some(conversation_id) = self.binding.active_id() else {
            return;
        };
        if let Some(TypingSignal::Start) = self.typing.keystroke(now) {
            self.session.emit(events::TYPING, conversation_id);
        }
    }

    /// Sends the current draft.
    pub async fn submit(&mut self) -> Result<Message> {
        let content = self.draft.clone();
        self.send_message(&content).await
    }

    /// Sends `content` to the active conversation.
    ///
    /// Preconditions (non-blank content, a selected conversation, a connected
    /// session) are checked before anything else; a violation raises a
    /// warning and makes no network call. `stop typing` goes out before the
    /// request. The draft is cleared and stays cleared if the request fails.
    pub async fn send_message(&mut self, content: &str) -> Result<Message> {
        let conversation_id = match self.check_send(content) {
            Ok(id) => id,
            Err(err) => {
                debug!(name: "chat.view.send_rejected", reason = %err, "Send rejected");
                self.publish(ViewUpdate::Notice((&err).into()));
                return Err(err.into());
            }
        };

        self.stop_typing();
        self.draft.clear();

        let posted = self
            .backend
            .post_message(content, &conversation_id, &self.session.identity().token)
            .await;

        match posted {
            Ok(PostedMessage { message, raw }) => {
                self.session.emit(events::NEW_MESSAGE, &raw);
                info!(name: "chat.view.message_sent", conversation_id = %conversation_id, message_id = %message.id, "Message sent");
                if self.store.append(message.clone()) {
                    self.publish(ViewUpdate::MessageAppended(message.clone()));
                }
                Ok(message)
            }
            Err(source) => {
                let err = SendError { source };
                warn!(name: "chat.view.send_failed", error = %err, cause = %err.source, "Message send failed");
                self.publish(ViewUpdate::Notice((&err).into()));
                Err(Error::Send(err))
            }
        }
    }

    fn check_send(&self, content: &str) -> std::result::Result<ConversationId, PreconditionError> {
        if content.trim().is_empty() {
            return Err(PreconditionError::EmptyContent);
        }
        let conversation_id = self
            .binding
            .active_id()
            .cloned()
            .ok_or(PreconditionError::NoConversation)?;
        self.session.require_connected()?;
        Ok(conversation_id)
    }

    /// Waits for the next socket event, connection state change or typing
    /// deadline and handles it.
    ///
    /// Returns `false` once no more socket events can arrive (the view was
    /// closed). Cancel-safe.
    pub async fn process_next(&mut self) -> bool {
        let deadline = self.typing.deadline();
        tokio::select! {
            inbound = self.inbox.recv() => match inbound {
                Some(inbound) => {
                    self.handle_inbound(inbound);
                    true
                }
                None => false,
            },
            Ok(()) = self.connection.changed() => {
                let state = *self.connection.borrow_and_update();
                self.publish(ViewUpdate::Connection(state));
                true
            }
            () = sleep_until(deadline) => {
                self.expire_typing(Instant::now());
                true
            }
        }
    }

    fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::PeerTyping(typing) => self.set_peer_typing(typing),
            Inbound::Message(message) => self.receive(message),
        }
    }

    fn receive(&mut self, message: Message) {
        match self.notifications.route(self.binding.active_id(), message) {
            Routed::Store(message) => {
                if self.store.append(message.clone()) {
                    self.publish(ViewUpdate::MessageAppended(message));
                } else {
                    debug!(name: "chat.view.duplicate_message", message_id = %message.id, "Duplicate message ignored");
                }
            }
            Routed::Notified { inserted: true } => {
                self.publish(ViewUpdate::RefreshConversations);
            }
            Routed::Notified { inserted: false } => {}
        }
    }

    fn expire_typing(&mut self, now: Instant) {
        if let Some(TypingSignal::Stop) = self.typing.expire(now) {
            self.emit_stop_typing();
        }
    }

    fn stop_typing(&mut self) {
        if let Some(TypingSignal::Stop) = self.typing.interrupt() {
            self.emit_stop_typing();
        }
    }

    fn emit_stop_typing(&self) {
        if let Some(conversation_id) = self.binding.active_id() {
            self.session.emit(events::STOP_TYPING, conversation_id);
        }
    }

    fn set_peer_typing(&mut self, typing: bool) {
        if self.peer_typing != typing {
            self.peer_typing = typing;
            self.publish(ViewUpdate::PeerTyping(typing));
        }
    }

    fn publish(&self, update: ViewUpdate) {
        // the presentation layer may have gone away first
        let _ = self.updates.send(update);
    }

    /// Waits up to `timeout` for the backend to acknowledge the session.
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        self.session.wait_connected(timeout).await
    }

    /// Tears down the session. Also happens on drop.
    pub fn close(&mut self) {
        self.session.close();
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.binding.active()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationRouter {
        &self.notifications
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    #[must_use]
    pub fn peer_typing(&self) -> bool {
        self.peer_typing
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

fn install_handlers(session: &Session, inbox: &mpsc::UnboundedSender<Inbound>) {
    let tx = inbox.clone();
    session.on(events::TYPING, move |_| {
        let _ = tx.send(Inbound::PeerTyping(true));
    });

    let tx = inbox.clone();
    session.on(events::STOP_TYPING, move |_| {
        let _ = tx.send(Inbound::PeerTyping(false));
    });

    let tx = inbox.clone();
    session.on(events::MESSAGE_RECEIVED, move |data: Value| {
        match serde_json::from_value::<Message>(data) {
            Ok(message) => {
                let _ = tx.send(Inbound::Message(message));
            }
            Err(e) => {
                warn!(name: "chat.view.malformed_message", error = %e, "Ignoring malformed message event");
            }
        }
    });
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
