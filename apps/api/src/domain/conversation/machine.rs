use std::path::Path;

use serde_json::{json, Map, Value};

use super::conversation::ConversationState;
use super::errors::{ChatError, ChatResult};
use super::value_objects::Stage;
use crate::agents::types::{parse_agent_list, parse_task_list};
use crate::agents::{AgentDescriptor, Pipeline, PipelineStage, TaskDescriptor};

/// Data a transition records on the conversation
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    None,
    ProjectInfo(Map<String, Value>),
    AgentList(Vec<AgentDescriptor>),
    TaskList(Vec<TaskDescriptor>),
}

/// A fully validated, not yet applied, step of the conversation
#[derive(Debug, Clone)]
pub struct Transition {
    /// Stage the transition was planned against
    pub from: Stage,
    /// Text to send back to the user
    pub response: String,
    pub update: StateUpdate,
}

/// Decides what each inbound message does
///
/// Planning never mutates the conversation. The caller commits the returned
/// [`Transition`] once everything else about the request has succeeded, so
/// a failure at any point leaves the conversation as it was.
pub struct StageMachine<'a> {
    pipeline: &'a dyn Pipeline,
    project_folder: &'a Path,
}

impl<'a> StageMachine<'a> {
    pub fn new(pipeline: &'a dyn Pipeline, project_folder: &'a Path) -> Self {
        Self {
            pipeline,
            project_folder,
        }
    }

    /// Plan the transition for `message` at the conversation's current stage
    pub async fn plan(&self, state: &ConversationState, message: &str) -> ChatResult<Transition> {
        let from = state.stage();

        let (response, update) = match from {
            Stage::InitialPrompt => {
                let reply = self
                    .pipeline
                    .invoke(PipelineStage::ProjectDefinition, "Process initial user input.", message)
                    .await?;
                (reply, StateUpdate::None)
            }
            Stage::ProjectDefinition => {
                let info = parse_project_info(message)?;
                let context = to_context(&info)?;
                let reply = self
                    .pipeline
                    .invoke(PipelineStage::ProjectDefinition, "Define project details.", &context)
                    .await?;
                (reply, StateUpdate::ProjectInfo(info))
            }
            Stage::AgentList => {
                let context = to_context(state.project_info())?;
                let reply = self
                    .pipeline
                    .invoke(PipelineStage::AgentList, "Generate agent list.", &context)
                    .await?;
                let agents = parse_agent_list(&reply)
                    .map_err(|e| ChatError::Parse(format!("Agent list is not valid JSON: {}", e)))?;
                (reply, StateUpdate::AgentList(agents))
            }
            Stage::TaskList => {
                let context = to_context(state.agent_list())?;
                let reply = self
                    .pipeline
                    .invoke(PipelineStage::TaskList, "Organize task list.", &context)
                    .await?;
                let tasks = parse_task_list(&reply)
                    .map_err(|e| ChatError::Parse(format!("Task list is not valid JSON: {}", e)))?;
                (reply, StateUpdate::TaskList(tasks))
            }
            Stage::Compiler => {
                let context = to_context(&json!({
                    "agent_list": state.agent_list(),
                    "task_list": state.task_list(),
                    "project_folder": self.project_folder.display().to_string(),
                }))?;
                let reply = self
                    .pipeline
                    .invoke(PipelineStage::Compiler, "Compile crew configuration.", &context)
                    .await?;
                (reply, StateUpdate::None)
            }
        };

        tracing::debug!(stage = %from, "Planned transition");

        Ok(Transition {
            from,
            response,
            update,
        })
    }
}

/// The user's project details must be a JSON object
fn parse_project_info(message: &str) -> ChatResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(info)) => Ok(info),
        Ok(other) => Err(ChatError::Parse(format!(
            "Project details must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ChatError::Parse(format!("Project details are not valid JSON: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn to_context<T: serde::Serialize + ?Sized>(value: &T) -> ChatResult<String> {
    serde_json::to_string(value).map_err(|e| ChatError::Unknown(e.to_string()))
}
