//! User-visible notices raised in place of errors.

use serde::Serialize;

use crate::error::{Error, FetchError, PreconditionError, SendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A toast-style message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&PreconditionError> for Notice {
    fn from(err: &PreconditionError) -> Self {
        match err {
            PreconditionError::EmptyContent => {
                Notice::warning("Empty Message", "Type a message before sending.")
            }
            PreconditionError::NoConversation => Notice::warning(
                "No Chat Selected",
                "Please select a chat to send a message.",
            ),
            PreconditionError::NotConnected => Notice::warning(
                "Socket Not Connected",
                "Please refresh the page or check the connection.",
            ),
        }
    }
}

impl From<&FetchError> for Notice {
    fn from(_: &FetchError) -> Self {
        Notice::error("Error Occurred!", "Failed to Load Messages")
    }
}

impl From<&SendError> for Notice {
    fn from(err: &SendError) -> Self {
        Notice::error(
            "Error Occurred!",
            err.reason().unwrap_or("Failed to send message."),
        )
    }
}

impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        match err {
            Error::Fetch(e) => e.into(),
            Error::Send(e) => e.into(),
            Error::Precondition(e) => e.into(),
            other => Notice::error("Error Occurred!", other.to_string()),
        }
    }
}
