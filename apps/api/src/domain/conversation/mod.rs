// Conversation domain module
// Contains the conversation aggregate, its stage value object, domain
// events and the stage machine that plans each transition.

#![allow(clippy::module_inception)]

pub mod conversation;
pub mod errors;
pub mod events;
pub mod machine;
pub mod value_objects;

// Re-export main types for convenience
pub use conversation::ConversationState;
pub use errors::{ChatError, ChatResult};
pub use events::ConversationEvent;
pub use machine::{StageMachine, StateUpdate, Transition};
pub use value_objects::Stage;
