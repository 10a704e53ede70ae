use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationId, MessageId, UserId, reference};

/// A chat message as created by the backend. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: MessageId,
    /// Conversation the message belongs to.
    #[serde(rename = "chat", alias = "chatId", deserialize_with = "reference")]
    pub chat_id: ConversationId,
    #[serde(rename = "sender", alias = "senderId", deserialize_with = "reference")]
    pub sender_id: UserId,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
