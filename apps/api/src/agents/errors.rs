use thiserror::Error;

/// Errors that can occur while running a crew stage
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM API error: {0}")]
    LlmError(String),

    #[error("Prompt template error: {0}")]
    TemplateError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
