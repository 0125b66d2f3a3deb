// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

use handlers::{chat, health, repos};
pub use state::{AppState, SharedState};

/// Build the service router
pub fn router(state: SharedState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Conversation
        .route("/chat-with-project", post(chat::chat_with_project))
        .route("/api/conversation", get(chat::get_conversation))
        // Repository scanning
        .route("/scan-repository", post(repos::scan_repository))
        .with_state(state)
}
