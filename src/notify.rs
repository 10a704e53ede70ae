//! Routing of incoming messages between the open conversation and the
//! unread notification list.

use std::collections::VecDeque;

use crate::domain::{ConversationId, Message};

/// Where an incoming message went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// Belongs to the active conversation; the caller appends it to the store.
    Store(Message),
    /// Belongs elsewhere. `inserted` is `false` when the id was already listed.
    Notified { inserted: bool },
}

/// Unread messages for conversations other than the active one, newest first,
/// unique by message id.
#[derive(Debug, Default)]
pub struct NotificationRouter {
    entries: VecDeque<Message>,
}

impl NotificationRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `message` against the conversation active right now.
    pub fn route(&mut self, active: Option<&ConversationId>, message: Message) -> Routed {
        if active == Some(&message.chat_id) {
            return Routed::Store(message);
        }
        Routed::Notified {
            inserted: self.insert(message),
        }
    }

    /// Idempotent insert by message id.
    pub fn insert(&mut self, message: Message) -> bool {
        if self.entries.iter().any(|m| m.id == message.id) {
            return false;
        }
        self.entries.push_front(message);
        true
    }

    /// Removes and returns the notifications of one conversation, newest first.
    pub fn take(&mut self, chat_id: &ConversationId) -> Vec<Message> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|m| &m.chat_id == chat_id);
        self.entries = kept.into();
        taken
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    /// Unread count for one conversation.
    #[must_use]
    pub fn count_for(&self, chat_id: &ConversationId) -> usize {
        self.entries.iter().filter(|m| &m.chat_id == chat_id).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
