use serde::{Deserialize, Serialize};

/// Model an agent runs on when the agent list does not name one
pub const DEFAULT_AGENT_MODEL: &str = "gpt-4";

fn default_agent_model() -> String {
    DEFAULT_AGENT_MODEL.to_string()
}

/// An agent produced by the agent-list stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(rename = "llm", default = "default_agent_model")]
    pub model: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub allow_delegation: bool,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// A task produced by the task-list stage
///
/// `agent` is a free-form reference to an agent role; it is not checked
/// against the agent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub description: String,
    pub agent: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgentListReply {
    Bare(Vec<AgentDescriptor>),
    Wrapped { agents: Vec<AgentDescriptor> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskListReply {
    Bare(Vec<TaskDescriptor>),
    Wrapped { tasks: Vec<TaskDescriptor> },
}

/// Decode an agent list from a model reply
///
/// Accepts a bare array or `{"agents": [...]}`, optionally inside a
/// markdown code fence.
pub fn parse_agent_list(reply: &str) -> serde_json::Result<Vec<AgentDescriptor>> {
    let parsed: AgentListReply = serde_json::from_str(strip_code_fence(reply))?;
    Ok(match parsed {
        AgentListReply::Bare(agents) | AgentListReply::Wrapped { agents } => agents,
    })
}

/// Decode a task list from a model reply
///
/// Accepts a bare array or `{"tasks": [...]}`, optionally inside a
/// markdown code fence.
pub fn parse_task_list(reply: &str) -> serde_json::Result<Vec<TaskDescriptor>> {
    let parsed: TaskListReply = serde_json::from_str(strip_code_fence(reply))?;
    Ok(match parsed {
        TaskListReply::Bare(tasks) | TaskListReply::Wrapped { tasks } => tasks,
    })
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
