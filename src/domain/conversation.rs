use serde::{Deserialize, Serialize};

use super::{ConversationId, UserId};

/// A user account as the backend describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            pic: None,
        }
    }
}

/// The signed-in user plus the bearer token used for HTTP calls.
///
/// Only `user` is ever sent over the real-time channel.
#[derive(Clone)]
pub struct Identity {
    pub user: User,
    pub token: String,
}

impl Identity {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A chat thread, direct or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "_id", alias = "id")]
    pub id: ConversationId,
    #[serde(rename = "isGroupChat", alias = "isGroup", default)]
    pub is_group: bool,
    #[serde(rename = "users", alias = "participants", default)]
    pub participants: Vec<User>,
    #[serde(rename = "chatName", alias = "name", default)]
    pub name: String,
}

impl Conversation {
    /// A direct conversation known only by id.
    pub fn new(id: impl Into<ConversationId>) -> Self {
        Self {
            id: id.into(),
            is_group: false,
            participants: Vec::new(),
            name: String::new(),
        }
    }

    pub fn participant(&self, id: &UserId) -> Option<&User> {
        self.participants.iter().find(|u| &u.id == id)
    }

    /// Header text for this conversation as seen by `me`.
    ///
    /// Groups show their name upper-cased; direct chats show the other
    /// participant, falling back to the stored name.
    pub fn title(&self, me: &UserId) -> String {
        if self.is_group {
            return self.name.to_uppercase();
        }
        self.participants
            .iter()
            .find(|u| &u.id != me)
            .map_or_else(|| self.name.clone(), |u| u.name.clone())
    }
}
