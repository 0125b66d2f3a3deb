use thiserror::Error;

use crate::agents::AgentError;
use crate::domain::relay::RelayError;

/// Errors raised while handling one chat message
///
/// The endpoint reports all of them the same way; the variants exist for
/// logging and tests.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed structured input or pipeline output
    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Pipeline(#[from] AgentError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("{0}")]
    Unknown(String),
}

pub type ChatResult<T> = Result<T, ChatError>;
