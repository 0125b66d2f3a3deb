use thiserror::Error;

/// Errors from scanning a repository
///
/// Returned as values so callers decide how severe each one is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Invalid GitHub repository URL: {0}")]
    InvalidUrl(String),

    #[error("GitHub API rate limit reached")]
    RateLimited,

    #[error("Failed to retrieve repository contents: {0}")]
    FetchError(String),
}

pub type ScanResult<T> = Result<T, ScanError>;
