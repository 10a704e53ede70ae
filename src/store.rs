//! Ordered message list of the active conversation.

use std::collections::HashSet;

use crate::domain::{Message, MessageId};

/// Append-only, insertion-ordered messages, unique by id.
///
/// A message echoed back over the real-time channel after a local append is
/// dropped here, whichever copy arrives first.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly loaded history in one step.
    pub fn replace(&mut self, history: Vec<Message>) {
        let mut ids = HashSet::with_capacity(history.len());
        let messages: Vec<Message> = history
            .into_iter()
            .filter(|m| ids.insert(m.id.clone()))
            .collect();
        self.messages = messages;
        self.ids = ids;
    }

    /// Appends `message` unless one with the same id is already present.
    pub fn append(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(id: &str, chat: &str) -> Message {
        Message {
            id: id.into(),
            chat_id: chat.into(),
            sender_id: "u1".into(),
            content: format!("content {id}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut store = MessageStore::new();
        assert!(store.append(msg("m2", "c1")));
        assert!(store.append(msg("m1", "c1")));
        let ids: Vec<_> = store.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
    }

    #[test]
    fn test_append_deduplicates_echo() {
        let mut store = MessageStore::new();
        assert!(store.append(msg("m1", "c1")));
        assert!(!store.append(msg("m1", "c1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut store = MessageStore::new();
        store.append(msg("old", "c1"));
        store.replace(vec![msg("a", "c2"), msg("b", "c2"), msg("a", "c2")]);

        assert_eq!(store.len(), 2);
        assert!(!store.contains(&"old".into()));
        assert_eq!(store.last().unwrap().id.as_str(), "b");

        // ids from the old history no longer block appends
        assert!(store.append(msg("old", "c2")));
    }
}
