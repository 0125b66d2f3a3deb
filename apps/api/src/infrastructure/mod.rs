// Infrastructure layer module
// Contains external service integrations and filesystem adapters
// Follows Hexagonal Architecture

pub mod github;
pub mod relays;
pub mod workspace;
