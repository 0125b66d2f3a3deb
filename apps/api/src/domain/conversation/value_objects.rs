use serde::{Deserialize, Serialize};

/// Where a conversation is in the crew-building pipeline
///
/// # Stage Transitions
/// ```text
/// InitialPrompt -> ProjectDefinition -> AgentList -> TaskList -> Compiler
/// ```
/// `Compiler` is terminal: further messages re-run the compiler without
/// moving the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for the user's first description of the project
    #[default]
    InitialPrompt,
    /// Waiting for the structured project details (JSON object)
    ProjectDefinition,
    /// Next request generates the agent list
    AgentList,
    /// Next request generates the task list
    TaskList,
    /// Next request compiles the crew files
    Compiler,
}

impl Stage {
    /// The stage that follows a successful request, `None` when terminal
    ///
    /// # Example
    /// ```
    /// use crewforge_api::domain::conversation::value_objects::Stage;
    ///
    /// assert_eq!(Stage::InitialPrompt.next(), Some(Stage::ProjectDefinition));
    /// assert_eq!(Stage::Compiler.next(), None);
    /// ```
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            InitialPrompt => Some(ProjectDefinition),
            ProjectDefinition => Some(AgentList),
            AgentList => Some(TaskList),
            TaskList => Some(Compiler),
            Compiler => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::InitialPrompt => write!(f, "initial_prompt"),
            Stage::ProjectDefinition => write!(f, "project_definition"),
            Stage::AgentList => write!(f, "agent_list"),
            Stage::TaskList => write!(f, "task_list"),
            Stage::Compiler => write!(f, "compiler"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_is_initial_prompt() {
        assert_eq!(Stage::default(), Stage::InitialPrompt);
    }

    #[test]
    fn stages_advance_one_step_at_a_time() {
        assert_eq!(Stage::ProjectDefinition.next(), Some(Stage::AgentList));
        assert_eq!(Stage::AgentList.next(), Some(Stage::TaskList));
        assert_eq!(Stage::TaskList.next(), Some(Stage::Compiler));
    }

    #[test]
    fn compiler_is_the_only_terminal_stage() {
        assert!(Stage::Compiler.is_terminal());
        assert!(!Stage::TaskList.is_terminal());
        assert!(!Stage::InitialPrompt.is_terminal());
    }

    #[test]
    fn stage_display_matches_wire_name() {
        assert_eq!(Stage::TaskList.to_string(), "task_list");
        assert_eq!(
            serde_json::to_value(Stage::TaskList).unwrap(),
            serde_json::json!("task_list")
        );
    }
}
