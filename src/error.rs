//! Error types for the chat session client.
//!
//! Every failure a user action can hit maps to one of [`FetchError`],
//! [`SendError`] or [`PreconditionError`]. The view turns them into a
//! [`Notice`](crate::view::Notice) instead of propagating them further.

use thiserror::Error;

use crate::domain::ConversationId;

/// Failure talking to the message backend over HTTP.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },
}

/// Loading a conversation's history failed. The store is left untouched.
#[derive(Error, Debug)]
#[error("failed to load messages for conversation {conversation_id}")]
pub struct FetchError {
    pub conversation_id: ConversationId,
    #[source]
    pub source: ApiError,
}

/// Posting a message failed. The cleared draft is not restored.
#[derive(Error, Debug)]
#[error("failed to send message")]
pub struct SendError {
    #[source]
    pub source: ApiError,
}

impl SendError {
    /// Server-provided reason, when the backend answered with an error body.
    pub fn reason(&self) -> Option<&str> {
        match &self.source {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// A send-dependent action was attempted while its preconditions did not hold.
/// Raised before any network call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("message content is empty")]
    EmptyContent,

    #[error("no conversation selected")]
    NoConversation,

    #[error("real-time session is not connected")]
    NotConnected,
}

/// Failure of the real-time transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not establish the connection.
    #[error("connect failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    /// The connection is gone; frames can no longer be sent.
    #[error("transport closed")]
    Closed,

    /// Frame could not be encoded.
    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration could not be loaded.
#[derive(Error, Debug)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] pub config::ConfigError);

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_reason() {
        let err = SendError {
            source: ApiError::Status {
                status: 400,
                message: "Invalid data passed into request".into(),
            },
        };
        assert_eq!(err.reason(), Some("Invalid data passed into request"));

        let err = SendError {
            source: ApiError::Status {
                status: 500,
                message: String::new(),
            },
        };
        assert_eq!(err.reason(), None);
    }

    #[test]
    fn test_precondition_converts() {
        let err: Error = PreconditionError::NotConnected.into();
        assert!(matches!(
            err,
            Error::Precondition(PreconditionError::NotConnected)
        ));
        assert_eq!(err.to_string(), "real-time session is not connected");
    }
}
