use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::AgentResult;

/// The four crew stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ProjectDefinition,
    AgentList,
    TaskList,
    Compiler,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::ProjectDefinition,
        PipelineStage::AgentList,
        PipelineStage::TaskList,
        PipelineStage::Compiler,
    ];
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::ProjectDefinition => write!(f, "project_definition"),
            PipelineStage::AgentList => write!(f, "agent_list"),
            PipelineStage::TaskList => write!(f, "task_list"),
            PipelineStage::Compiler => write!(f, "compiler"),
        }
    }
}

/// Text-in/text-out access to the crew
///
/// Each call runs one stage's agent on `task` with `context` and returns the
/// agent's raw reply. Implementations must not interpret the reply.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn invoke(&self, stage: PipelineStage, task: &str, context: &str) -> AgentResult<String>;
}
