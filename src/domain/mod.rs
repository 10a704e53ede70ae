//! Chat domain model: identifiers, users, conversations and messages.
//!
//! Wire names follow the chat backend (`_id`, `chatName`, `createdAt`, ...);
//! plain names are accepted as aliases so hand-written payloads deserialize too.

mod conversation;
mod message;

pub use conversation::{Conversation, Identity, User};
pub use message::Message;

use serde::{Deserialize, Deserializer};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a conversation (direct or group chat).
    ConversationId
);
string_id!(
    /// Identifier assigned to a message by the backend.
    MessageId
);
string_id!(
    /// Identifier of a user account.
    UserId
);

/// A reference the backend sends either as a bare id or as a populated document.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reference<T> {
    Id(T),
    Embedded {
        #[serde(rename = "_id", alias = "id")]
        id: T,
    },
}

/// Deserializes a field that may be an id string or an object carrying `_id`.
pub(crate) fn reference<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Reference::deserialize(deserializer)? {
        Reference::Id(id) | Reference::Embedded { id } => id,
    })
}
