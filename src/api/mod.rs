//! Message backend collaborator: history fetch and message creation.

mod http;

pub use http::HttpMessageApi;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConversationId, Message};
use crate::error::ApiError;

/// Body of `POST /api/message`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub content: &'a str,
    #[serde(rename = "chatId")]
    pub chat_id: &'a ConversationId,
}

/// A message the backend just created.
///
/// `raw` is the response body exactly as received, with `chat` and `sender`
/// still populated; it is what gets relayed as `new message`, since the
/// backend fans it out to `chat.users`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub message: Message,
    pub raw: Value,
}

impl PostedMessage {
    pub fn from_raw(raw: Value) -> Result<Self, ApiError> {
        let message = Message::deserialize(&raw)?;
        Ok(Self { message, raw })
    }
}

/// HTTP side of the chat backend. Every call carries the user's bearer token.
#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// Full history of a conversation, oldest first.
    async fn fetch_history(
        &self,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<Vec<Message>, ApiError>;

    /// Creates a message and returns it with its backend-assigned id and timestamp.
    async fn post_message(
        &self,
        content: &str,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<PostedMessage, ApiError>;
}

#[async_trait]
impl<T: MessageBackend + ?Sized> MessageBackend for Arc<T> {
    async fn fetch_history(
        &self,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<Vec<Message>, ApiError> {
        (**self).fetch_history(conversation, token).await
    }

    async fn post_message(
        &self,
        content: &str,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<PostedMessage, ApiError> {
        (**self).post_message(content, conversation, token).await
    }
}
