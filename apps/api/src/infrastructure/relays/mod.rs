// Chat relay implementations
// Adapters that implement the domain ChatRelay interface

pub mod http_chat_relay;

pub use http_chat_relay::{HttpChatRelay, DEFAULT_CHAT_BACKEND_URL};
