use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::{AgentError, AgentResult};
use super::pipeline::{Pipeline, PipelineStage};
use super::prompts::library;
use super::types::DEFAULT_AGENT_MODEL;

/// Persona of one crew agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewAgent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub model: String,
    pub verbose: bool,
    pub allow_delegation: bool,
}

impl CrewAgent {
    /// The agent that runs a given stage
    pub fn for_stage(stage: PipelineStage) -> Self {
        let (role, goal, backstory) = match stage {
            PipelineStage::ProjectDefinition => (
                "Project Definition Specialist",
                "Gather and structure the user's project details so later stages \
                 can build a working crew application from them.",
                "Turns loose project ideas into clear, structured project plans.",
            ),
            PipelineStage::AgentList => (
                "Agent List Developer",
                "Derive the list of agents the project needs, covering every part \
                 of the user's requirements.",
                "Knows which mix of roles and tools a crew needs to ship a project.",
            ),
            PipelineStage::TaskList => (
                "Task List Organizer",
                "Break the project into sequential tasks and assign each one to the \
                 best-suited agent.",
                "Converts project goals into an ordered plan of concrete tasks.",
            ),
            PipelineStage::Compiler => (
                "Crew Compiler",
                "Assemble the agents and tasks into the files of a runnable crew \
                 application.",
                "Packages crew configurations into complete, consistent projects.",
            ),
        };

        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            model: DEFAULT_AGENT_MODEL.to_string(),
            verbose: true,
            allow_delegation: false,
        }
    }
}

/// LLM-backed implementation of [`Pipeline`]
///
/// Talks to an OpenAI-compatible `/chat/completions` endpoint. Calls are
/// made once; there is no retry and no deadline.
pub struct Crew {
    agents: HashMap<PipelineStage, CrewAgent>,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

impl Crew {
    /// Create the standard four-agent crew
    pub fn new(api_key: String, base_url: String) -> Self {
        let agents = PipelineStage::ALL
            .into_iter()
            .map(|stage| (stage, CrewAgent::for_stage(stage)))
            .collect();

        Self {
            agents,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Run every agent on `model` instead of its own
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        for agent in self.agents.values_mut() {
            agent.model = model.clone();
        }
        self
    }

    pub fn agent(&self, stage: PipelineStage) -> Option<&CrewAgent> {
        self.agents.get(&stage)
    }

    fn build_request(
        &self,
        agent: &CrewAgent,
        stage: PipelineStage,
        task: &str,
        context: &str,
    ) -> AgentResult<CompletionRequest> {
        let template = library::for_stage(stage);
        let variables: HashMap<&str, &str> = [
            ("role", agent.role.as_str()),
            ("goal", agent.goal.as_str()),
            ("backstory", agent.backstory.as_str()),
            ("task", task),
            ("context", context),
        ]
        .into_iter()
        .collect();

        Ok(CompletionRequest {
            model: agent.model.clone(),
            messages: vec![
                CompletionMessage {
                    role: "system".to_string(),
                    content: template.render_system(&variables)?,
                },
                CompletionMessage {
                    role: "user".to_string(),
                    content: template.render(&variables)?,
                },
            ],
            temperature: 0.0,
        })
    }
}

#[async_trait]
impl Pipeline for Crew {
    async fn invoke(&self, stage: PipelineStage, task: &str, context: &str) -> AgentResult<String> {
        let agent = self
            .agents
            .get(&stage)
            .ok_or_else(|| AgentError::LlmError(format!("No agent configured for stage {}", stage)))?;
        let request = self.build_request(agent, stage, task, context)?;

        if agent.verbose {
            tracing::debug!(%stage, role = %agent.role, task, context, "Invoking crew agent");
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error {}: {}", status, body)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::LlmError("No choices in completion".to_string()))?;

        if agent.verbose {
            tracing::debug!(%stage, reply = %content, "Crew agent replied");
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn_llm(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                        captured.lock().unwrap().push(body);
                        (status, Json(reply))
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1", addr), captured)
    }

    #[test]
    fn crew_has_an_agent_per_stage() {
        let crew = Crew::new("key".to_string(), "http://localhost".to_string());

        for stage in PipelineStage::ALL {
            let agent = crew.agent(stage).unwrap();
            assert_eq!(agent.model, "gpt-4");
            assert!(!agent.allow_delegation);
        }
        assert_eq!(
            crew.agent(PipelineStage::Compiler).unwrap().role,
            "Crew Compiler"
        );
    }

    #[test]
    fn with_model_overrides_every_agent() {
        let crew = Crew::new("key".to_string(), "http://localhost".to_string())
            .with_model("gpt-4o-mini");

        assert!(PipelineStage::ALL
            .iter()
            .all(|stage| crew.agent(*stage).unwrap().model == "gpt-4o-mini"));
    }

    #[tokio::test]
    async fn invoke_returns_first_choice_content() {
        let (base_url, captured) = spawn_llm(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "Project: Todo"}}]}),
        )
        .await;
        let crew = Crew::new("sk-test".to_string(), base_url);

        let reply = crew
            .invoke(PipelineStage::ProjectDefinition, "Process initial user input.", "Build me a todo app")
            .await
            .unwrap();

        assert_eq!(reply, "Project: Todo");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["model"], "gpt-4");
        assert_eq!(requests[0]["messages"][0]["role"], "system");
        let user = requests[0]["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Process initial user input."));
        assert!(user.contains("Build me a todo app"));
    }

    #[tokio::test]
    async fn invoke_surfaces_api_errors() {
        let (base_url, _) = spawn_llm(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "bad key"}}),
        )
        .await;
        let crew = Crew::new("sk-bad".to_string(), base_url);

        let result = crew.invoke(PipelineStage::AgentList, "Generate agent list.", "{}").await;

        match result {
            Err(AgentError::LlmError(msg)) => assert!(msg.contains("401")),
            other => panic!("Expected LlmError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invoke_rejects_empty_choices() {
        let (base_url, _) = spawn_llm(StatusCode::OK, json!({"choices": []})).await;
        let crew = Crew::new("sk-test".to_string(), base_url);

        let result = crew.invoke(PipelineStage::TaskList, "Organize task list.", "[]").await;

        assert!(matches!(result, Err(AgentError::LlmError(_))));
    }
}
