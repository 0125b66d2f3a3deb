use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{ChatError, ChatResult};
use super::events::ConversationEvent;
use super::machine::StateUpdate;
use super::value_objects::Stage;
use crate::agents::{AgentDescriptor, TaskDescriptor};

/// Conversation aggregate root
///
/// Holds everything the crew has produced so far for the single
/// conversation this process serves. State only changes through
/// [`ConversationState::commit`], which applies a fully validated
/// transition in one step.
///
/// # Invariants
/// - Stage only moves forward, one step per commit
/// - `project_info` is set exactly when leaving `ProjectDefinition`
/// - `agent_list` is set exactly when leaving `AgentList`
/// - `task_list` is set exactly when leaving `TaskList`
///
/// # Example
/// ```
/// use crewforge_api::domain::conversation::{ConversationState, Stage, StateUpdate};
///
/// let mut state = ConversationState::new();
/// let events = state.commit(Stage::InitialPrompt, StateUpdate::None).expect("valid commit");
///
/// assert_eq!(state.stage(), Stage::ProjectDefinition);
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: Uuid,
    stage: Stage,
    project_info: Map<String, Value>,
    agent_list: Vec<AgentDescriptor>,
    task_list: Vec<TaskDescriptor>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Creates a conversation at `InitialPrompt` with nothing recorded
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::InitialPrompt,
            project_info: Map::new(),
            agent_list: Vec::new(),
            task_list: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a planned transition
    ///
    /// # Arguments
    /// * `from` - The stage the transition was planned against
    /// * `update` - Data recorded by the transition
    ///
    /// # Returns
    /// * `Ok(Vec<ConversationEvent>)` - Events describing what changed
    /// * `Err(ChatError)` - If the transition was planned against another
    ///   stage or carries data for the wrong stage; state is untouched
    pub fn commit(&mut self, from: Stage, update: StateUpdate) -> ChatResult<Vec<ConversationEvent>> {
        if from != self.stage {
            return Err(ChatError::Unknown(format!(
                "Transition planned for stage {} but conversation is at {}",
                from, self.stage
            )));
        }

        let expected = match &update {
            StateUpdate::None => from == Stage::InitialPrompt || from.is_terminal(),
            StateUpdate::ProjectInfo(_) => from == Stage::ProjectDefinition,
            StateUpdate::AgentList(_) => from == Stage::AgentList,
            StateUpdate::TaskList(_) => from == Stage::TaskList,
        };
        if !expected {
            return Err(ChatError::Unknown(format!(
                "Update does not belong to stage {}",
                from
            )));
        }

        let mut events = Vec::new();
        match update {
            StateUpdate::None => {}
            StateUpdate::ProjectInfo(info) => {
                events.push(ConversationEvent::ProjectDefined {
                    conversation_id: self.id,
                    fields: info.len(),
                });
                self.project_info = info;
            }
            StateUpdate::AgentList(agents) => {
                events.push(ConversationEvent::AgentsListed {
                    conversation_id: self.id,
                    count: agents.len(),
                });
                self.agent_list = agents;
            }
            StateUpdate::TaskList(tasks) => {
                events.push(ConversationEvent::TasksListed {
                    conversation_id: self.id,
                    count: tasks.len(),
                });
                self.task_list = tasks;
            }
        }

        if let Some(next) = self.stage.next() {
            events.push(ConversationEvent::StageAdvanced {
                conversation_id: self.id,
                from: self.stage,
                to: next,
            });
            self.stage = next;
        }
        self.updated_at = Utc::now();

        Ok(events)
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn project_info(&self) -> &Map<String, Value> {
        &self.project_info
    }

    pub fn agent_list(&self) -> &[AgentDescriptor] {
        &self.agent_list
    }

    pub fn task_list(&self) -> &[TaskDescriptor] {
        &self.task_list
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent(role: &str) -> AgentDescriptor {
        AgentDescriptor {
            role: role.to_string(),
            goal: "goal".to_string(),
            backstory: "backstory".to_string(),
            model: "gpt-4".to_string(),
            verbose: false,
            allow_delegation: false,
            tools: vec![],
        }
    }

    fn project_info() -> Map<String, Value> {
        json!({"name": "todo", "stack": "rust"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn new_conversation_is_empty() {
        let state = ConversationState::new();

        assert_eq!(state.stage(), Stage::InitialPrompt);
        assert!(state.project_info().is_empty());
        assert!(state.agent_list().is_empty());
        assert!(state.task_list().is_empty());
        assert_eq!(state.created_at(), state.updated_at());
    }

    #[test]
    fn commit_walks_all_stages_in_order() {
        let mut state = ConversationState::new();

        state.commit(Stage::InitialPrompt, StateUpdate::None).unwrap();
        state
            .commit(Stage::ProjectDefinition, StateUpdate::ProjectInfo(project_info()))
            .unwrap();
        state
            .commit(Stage::AgentList, StateUpdate::AgentList(vec![agent("Coder")]))
            .unwrap();
        state
            .commit(
                Stage::TaskList,
                StateUpdate::TaskList(vec![TaskDescriptor {
                    description: "Write code".to_string(),
                    agent: "Coder".to_string(),
                    tools: vec![],
                }]),
            )
            .unwrap();

        assert_eq!(state.stage(), Stage::Compiler);
        assert_eq!(state.project_info()["name"], "todo");
        assert_eq!(state.agent_list().len(), 1);
        assert_eq!(state.task_list()[0].agent, "Coder");
    }

    #[test]
    fn commit_emits_data_and_stage_events() {
        let mut state = ConversationState::new();
        state.commit(Stage::InitialPrompt, StateUpdate::None).unwrap();

        let events = state
            .commit(Stage::ProjectDefinition, StateUpdate::ProjectInfo(project_info()))
            .unwrap();

        assert_eq!(
            events,
            vec![
                ConversationEvent::ProjectDefined {
                    conversation_id: state.id(),
                    fields: 2,
                },
                ConversationEvent::StageAdvanced {
                    conversation_id: state.id(),
                    from: Stage::ProjectDefinition,
                    to: Stage::AgentList,
                },
            ]
        );
    }

    #[test]
    fn compiler_commit_keeps_stage() {
        let mut state = ConversationState::new();
        state.commit(Stage::InitialPrompt, StateUpdate::None).unwrap();
        state
            .commit(Stage::ProjectDefinition, StateUpdate::ProjectInfo(Map::new()))
            .unwrap();
        state.commit(Stage::AgentList, StateUpdate::AgentList(vec![])).unwrap();
        state.commit(Stage::TaskList, StateUpdate::TaskList(vec![])).unwrap();

        let events = state.commit(Stage::Compiler, StateUpdate::None).unwrap();

        assert!(events.is_empty());
        assert_eq!(state.stage(), Stage::Compiler);
    }

    #[test]
    fn stale_commit_is_rejected_without_changes() {
        let mut state = ConversationState::new();

        let result = state.commit(Stage::AgentList, StateUpdate::AgentList(vec![agent("Coder")]));

        assert!(matches!(result, Err(ChatError::Unknown(_))));
        assert_eq!(state.stage(), Stage::InitialPrompt);
        assert!(state.agent_list().is_empty());
    }

    #[test]
    fn empty_update_is_rejected_mid_pipeline() {
        let mut state = ConversationState::new();
        state.commit(Stage::InitialPrompt, StateUpdate::None).unwrap();
        state
            .commit(Stage::ProjectDefinition, StateUpdate::ProjectInfo(project_info()))
            .unwrap();

        let result = state.commit(Stage::AgentList, StateUpdate::None);

        assert!(matches!(result, Err(ChatError::Unknown(_))));
        assert_eq!(state.stage(), Stage::AgentList);
    }

    #[test]
    fn mismatched_update_is_rejected() {
        let mut state = ConversationState::new();

        let result = state.commit(Stage::InitialPrompt, StateUpdate::ProjectInfo(project_info()));

        assert!(result.is_err());
        assert_eq!(state.stage(), Stage::InitialPrompt);
        assert!(state.project_info().is_empty());
    }
}
