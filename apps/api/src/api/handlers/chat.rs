use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::{AppState, SharedState};
use crate::domain::conversation::{ChatError, ChatResult, ConversationState, Stage, StageMachine, Transition};
use crate::infrastructure::workspace::write_compiled_files;

pub const DEFAULT_CONVERSATION_ID: &str = "default-conversation-id";

fn default_conversation_id() -> String {
    DEFAULT_CONVERSATION_ID.to_string()
}

/// Request body for a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_conversation_id", alias = "conversationId")]
    pub conversation_id: String,
}

/// Response carrying the crew's reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Snapshot of the conversation state
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub stage: Stage,
    pub project_info: Map<String, Value>,
    pub agent_count: usize,
    pub task_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ConversationState> for ConversationResponse {
    fn from(state: &ConversationState) -> Self {
        Self {
            id: state.id(),
            stage: state.stage(),
            project_info: state.project_info().clone(),
            agent_count: state.agent_list().len(),
            task_count: state.task_list().len(),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
        }
    }
}

/// Send a message to the crew
///
/// POST /chat-with-project
///
/// Failures are logged and returned as `{"status": "error", ...}` with a
/// 200 status; the conversation is left unchanged.
pub async fn chat_with_project(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| report(ChatError::Parse(e.body_text())))?;

    let response = process_message(&state, &req.message, &req.conversation_id)
        .await
        .map_err(report)?;

    Ok(Json(ChatResponse { response }))
}

/// Get the current conversation state
///
/// GET /api/conversation
pub async fn get_conversation(State(state): State<SharedState>) -> Json<ConversationResponse> {
    let conversation = state.conversation.lock().await;
    Json(ConversationResponse::from(&*conversation))
}

fn report(error: ChatError) -> ApiError {
    tracing::error!(error = %error, "Error in chat_with_project endpoint");
    ApiError::from(error)
}

/// Plan, deliver and commit one message
///
/// The conversation lock is held throughout and the transition is only
/// committed after the relay accepted the response. Failing to write the
/// compiled files does not fail the request.
async fn process_message(state: &AppState, message: &str, conversation_id: &str) -> ChatResult<String> {
    let mut conversation = state.conversation.lock().await;

    let machine = StageMachine::new(state.pipeline.as_ref(), &state.project_folder);
    let Transition {
        from,
        response,
        update,
    } = machine.plan(&conversation, message).await?;

    // Best effort: the compiled payload is returned even when it cannot be written
    if from == Stage::Compiler {
        let project_name = project_name(conversation.project_info());
        match write_compiled_files(&state.project_folder, &response, project_name).await {
            Ok(written) => {
                tracing::info!(count = written.len(), folder = %state.project_folder.display(), "Compiled crew files")
            }
            Err(e) => {
                tracing::warn!(error = %e, folder = %state.project_folder.display(), "Compiled crew files not written")
            }
        }
    }

    state.relay.send(&response, conversation_id).await?;

    for event in conversation.commit(from, update)? {
        tracing::info!(conversation = %event.conversation_id(), conversation_id, "{}", event);
    }

    Ok(response)
}

/// Directory name for the compiled project, taken from the project info
fn project_name(info: &Map<String, Value>) -> Option<&str> {
    ["project_name", "Project Name", "name"]
        .iter()
        .find_map(|key| info.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversation_id_defaults_and_accepts_camel_case() {
        let req: ChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert_eq!(req.conversation_id, DEFAULT_CONVERSATION_ID);

        let req: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "conversationId": "abc"})).unwrap();
        assert_eq!(req.conversation_id, "abc");

        let req: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "conversation_id": "xyz"})).unwrap();
        assert_eq!(req.conversation_id, "xyz");
    }

    #[test]
    fn project_name_prefers_explicit_keys() {
        let info = json!({"name": "fallback", "Project Name": "Todo App"});
        assert_eq!(project_name(info.as_object().unwrap()), Some("Todo App"));

        let info = json!({"name": "  "});
        assert_eq!(project_name(info.as_object().unwrap()), None);

        let info = json!({"project_name": 42});
        assert_eq!(project_name(info.as_object().unwrap()), None);
    }
}
