use uuid::Uuid;

use super::value_objects::Stage;

/// Domain events emitted when a transition is committed to a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// The conversation moved to the next stage
    StageAdvanced {
        conversation_id: Uuid,
        from: Stage,
        to: Stage,
    },
    /// Structured project info was recorded
    ProjectDefined {
        conversation_id: Uuid,
        /// Number of top-level keys in the project info
        fields: usize,
    },
    /// The agent list was recorded
    AgentsListed { conversation_id: Uuid, count: usize },
    /// The task list was recorded
    TasksListed { conversation_id: Uuid, count: usize },
}

impl ConversationEvent {
    pub fn conversation_id(&self) -> Uuid {
        match self {
            ConversationEvent::StageAdvanced { conversation_id, .. }
            | ConversationEvent::ProjectDefined { conversation_id, .. }
            | ConversationEvent::AgentsListed { conversation_id, .. }
            | ConversationEvent::TasksListed { conversation_id, .. } => *conversation_id,
        }
    }
}

impl std::fmt::Display for ConversationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationEvent::StageAdvanced { from, to, .. } => {
                write!(f, "stage advanced {} -> {}", from, to)
            }
            ConversationEvent::ProjectDefined { fields, .. } => {
                write!(f, "project defined with {} fields", fields)
            }
            ConversationEvent::AgentsListed { count, .. } => write!(f, "{} agents listed", count),
            ConversationEvent::TasksListed { count, .. } => write!(f, "{} tasks listed", count),
        }
    }
}
