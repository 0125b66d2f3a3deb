// GitHub repository scanning
// Reads every file of a repository through the contents API

pub mod errors;
pub mod scanner;

pub use errors::{ScanError, ScanResult};
pub use scanner::{RepoScanner, DEFAULT_GITHUB_API_URL};
