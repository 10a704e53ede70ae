//! `reqwest` implementation of [`MessageBackend`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::{MessageBackend, PostedMessage, SendMessageRequest};
use crate::config::ApiConfig;
use crate::domain::{ConversationId, Message};
use crate::error::ApiError;

/// HTTP client for the message endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use chatline::api::{HttpMessageApi, MessageBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpMessageApi::new("http://localhost:5000")?;
/// let history = api.fetch_history(&"c1".into(), "token").await?;
/// println!("{} messages", history.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpMessageApi {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpMessageApi {
    /// Client with default settings.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ApiError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Client with a custom `reqwest` client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Client built from the `api` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(&config.base_url, http)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            warn!(name: "chat.api.error_status", status = status.as_u16(), "Backend returned an error");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl MessageBackend for HttpMessageApi {
    async fn fetch_history(
        &self,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<Vec<Message>, ApiError> {
        let url = self.url(&["api", "message", conversation.as_str()])?;
        debug!(name: "chat.api.fetch_history", conversation_id = %conversation, "Fetching history");
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Self::handle_response(response).await
    }

    async fn post_message(
        &self,
        content: &str,
        conversation: &ConversationId,
        token: &str,
    ) -> Result<PostedMessage, ApiError> {
        let url = self.url(&["api", "message"])?;
        let body = SendMessageRequest {
            content,
            chat_id: conversation,
        };
        debug!(name: "chat.api.post_message", conversation_id = %conversation, "Posting message");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        PostedMessage::from_raw(Self::handle_response(response).await?)
    }
}
