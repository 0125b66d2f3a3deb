use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::relay::{ChatRelay, RelayError, DEFAULT_RELAY_ERROR};

/// Default chat backend endpoint
pub const DEFAULT_CHAT_BACKEND_URL: &str = "http://localhost:5001/api/chat-messages";

/// HTTP implementation of ChatRelay
///
/// Posts `{query, conversation_id}` to the chat backend and reads its
/// `{status, error?}` reply. The reply body decides the outcome; the HTTP
/// status code is not consulted.
pub struct HttpChatRelay {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    query: &'a str,
    conversation_id: &'a str,
}

/// Reply body of the chat backend
///
/// Fields are kept loose so that odd replies still count as rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayReply {
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub error: Value,
}

impl RelayReply {
    /// Anything but `status: "success"` is a rejection
    ///
    /// The rejection carries `error` when it is a string.
    pub fn into_result(self) -> Result<(), RelayError> {
        if self.status.as_str() == Some("success") {
            return Ok(());
        }
        let message = match self.error {
            Value::String(message) => message,
            _ => DEFAULT_RELAY_ERROR.to_string(),
        };
        Err(RelayError::Rejected(message))
    }
}

impl HttpChatRelay {
    /// Creates a new HttpChatRelay
    ///
    /// # Arguments
    /// * `endpoint` - Full URL of the backend's chat-messages endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatRelay for HttpChatRelay {
    async fn send(&self, query: &str, conversation_id: &str) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest {
                query,
                conversation_id,
            })
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let reply: RelayReply = response
            .json()
            .await
            .map_err(|e| RelayError::Transport(format!("Unreadable reply: {}", e)))?;

        reply.into_result()
    }
}
