//! Scopes the session to one conversation at a time.

use tracing::info;

use crate::domain::{Conversation, ConversationId};
use crate::session::Session;
use crate::transport::events;

/// Outcome of a selection: what was active before and what is active now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub previous: Option<ConversationId>,
    pub current: Option<ConversationId>,
}

impl Switch {
    /// Whether the active conversation id actually changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Holds the active conversation and issues the join/leave scoping calls.
///
/// Incoming events are always checked with [`ConversationBinding::is_active`]
/// at delivery time, so a handler installed before a switch never routes
/// against a stale selection.
#[derive(Debug, Default)]
pub struct ConversationBinding {
    active: Option<Conversation>,
    emit_leave_on_switch: bool,
}

impl ConversationBinding {
    pub fn new(emit_leave_on_switch: bool) -> Self {
        Self {
            active: None,
            emit_leave_on_switch,
        }
    }

    /// Makes `conversation` the active one.
    pub fn select(&mut self, conversation: Option<Conversation>) -> Switch {
        let previous = self.active.take().map(|c| c.id);
        let current = conversation.as_ref().map(|c| c.id.clone());
        self.active = conversation;
        Switch { previous, current }
    }

    /// Emits the scoping events for `switch`: `leave chat` for the previous
    /// conversation when configured and the id changed, then `join chat` for
    /// the new one.
    pub fn apply(&self, session: &Session, switch: &Switch) {
        if self.emit_leave_on_switch && switch.changed() {
            if let Some(previous) = &switch.previous {
                session.emit(events::LEAVE_CHAT, previous);
            }
        }
        if let Some(current) = &switch.current {
            session.emit(events::JOIN_CHAT, current);
            info!(name: "chat.binding.joined", session_id = %session.id(), conversation_id = %current, "Joined conversation");
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active.as_ref().map(|c| &c.id)
    }

    #[must_use]
    pub fn is_active(&self, chat_id: &ConversationId) -> bool {
        self.active_id() == Some(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, User};
    use crate::transport::loopback;

    #[test]
    fn test_select_reports_switch() {
        let mut binding = ConversationBinding::default();
        let first = binding.select(Some(Conversation::new("c1")));
        assert_eq!(first.previous, None);
        assert_eq!(first.current, Some("c1".into()));
        assert!(binding.is_active(&"c1".into()));

        let second = binding.select(Some(Conversation::new("c2")));
        assert_eq!(second.previous, Some("c1".into()));
        assert!(second.changed());
        assert!(!binding.is_active(&"c1".into()));

        let cleared = binding.select(None);
        assert_eq!(cleared.current, None);
        assert!(binding.active().is_none());
    }

    #[tokio::test]
    async fn test_apply_join_only_by_default() {
        let (link, mut remote) = loopback::pair();
        let session = Session::open(link, Identity::new(User::new("u1", "Ana"), "t"));
        let mut binding = ConversationBinding::default();

        let switch = binding.select(Some(Conversation::new("c1")));
        binding.apply(&session, &switch);
        let switch = binding.select(Some(Conversation::new("c2")));
        binding.apply(&session, &switch);

        let frames = remote.drain();
        let scoped: Vec<_> = frames
            .iter()
            .filter(|f| f.event != events::SETUP)
            .map(|f| (f.event.as_str(), f.data.as_str().unwrap_or_default()))
            .collect();
        assert_eq!(
            scoped,
            vec![(events::JOIN_CHAT, "c1"), (events::JOIN_CHAT, "c2")]
        );
    }

    #[tokio::test]
    async fn test_apply_leave_when_configured() {
        let (link, mut remote) = loopback::pair();
        let session = Session::open(link, Identity::new(User::new("u1", "Ana"), "t"));
        let mut binding = ConversationBinding::new(true);

        let switch = binding.select(Some(Conversation::new("c1")));
        binding.apply(&session, &switch);
        let switch = binding.select(Some(Conversation::new("c1")));
        binding.apply(&session, &switch);
        let switch = binding.select(Some(Conversation::new("c2")));
        binding.apply(&session, &switch);

        assert_eq!(
            remote.drain_events(),
            vec![
                events::SETUP,
                events::JOIN_CHAT,
                events::JOIN_CHAT,
                events::LEAVE_CHAT,
                events::JOIN_CHAT
            ]
        );
    }
}
