use async_trait::async_trait;
use thiserror::Error;

/// Message used when the chat backend rejects a response without saying why
pub const DEFAULT_RELAY_ERROR: &str = "Failed to send response";

/// Errors reported by a chat relay
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The backend answered with a non-success status
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or answered with something unreadable
    #[error("Chat backend unavailable: {0}")]
    Transport(String),
}

/// Delivers crew responses to the chat backend
///
/// Defines the contract for the outbound half of a conversation.
/// Implementations handle the backend's wire format.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Send `query` into the conversation identified by `conversation_id`
    async fn send(&self, query: &str, conversation_id: &str) -> Result<(), RelayError>;
}
