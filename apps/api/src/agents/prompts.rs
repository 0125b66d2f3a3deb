// Prompt templates for crew stages
//
// Prompts are versioned so a reply can be traced back to the template
// that produced it.

use std::collections::HashMap;

use super::errors::{AgentError, AgentResult};
use super::pipeline::PipelineStage;

/// Prompt template structure
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// Render the system prompt with variables
    pub fn render_system(&self, variables: &HashMap<&str, &str>) -> AgentResult<String> {
        substitute(&self.system, variables)
    }

    /// Render the user template with variables
    ///
    /// Every `{{name}}` placeholder must have a value. Substituted values are
    /// inserted verbatim and never re-scanned, so a context containing `{{`
    /// is safe.
    pub fn render(&self, variables: &HashMap<&str, &str>) -> AgentResult<String> {
        substitute(&self.user_template, variables)
    }
}

fn substitute(template: &str, variables: &HashMap<&str, &str>) -> AgentResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| AgentError::TemplateError("unterminated placeholder".to_string()))?;
        let name = after[..end].trim();
        let value = variables
            .get(name)
            .ok_or_else(|| AgentError::TemplateError(format!("missing variable: {}", name)))?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

pub mod library {
    use super::{PipelineStage, PromptTemplate};

    const PERSONA: &str = "You are the {{role}}.\n\
                           Goal: {{goal}}\n\
                           Backstory: {{backstory}}";

    /// Template for a crew stage
    pub fn for_stage(stage: PipelineStage) -> PromptTemplate {
        match stage {
            PipelineStage::ProjectDefinition => project_definition(),
            PipelineStage::AgentList => agent_list(),
            PipelineStage::TaskList => task_list(),
            PipelineStage::Compiler => compiler(),
        }
    }

    pub fn project_definition() -> PromptTemplate {
        PromptTemplate {
            name: "project_definition".to_string(),
            version: "1.0.0".to_string(),
            system: PERSONA.to_string(),
            user_template: "Task: {{task}}\n\n\
                            Project details:\n{{context}}\n\n\
                            Organize them under Project Name, Project Objective, \
                            Features, Technology Stack and Other information."
                .to_string(),
        }
    }

    pub fn agent_list() -> PromptTemplate {
        PromptTemplate {
            name: "agent_list".to_string(),
            version: "1.0.0".to_string(),
            system: PERSONA.to_string(),
            user_template: "Task: {{task}}\n\n\
                            Project info:\n{{context}}\n\n\
                            Reply with only a JSON array of agents. Each agent has: \
                            role, goal, backstory, llm, verbose, allow_delegation, tools."
                .to_string(),
        }
    }

    pub fn task_list() -> PromptTemplate {
        PromptTemplate {
            name: "task_list".to_string(),
            version: "1.0.0".to_string(),
            system: PERSONA.to_string(),
            user_template: "Task: {{task}}\n\n\
                            Agents:\n{{context}}\n\n\
                            Reply with only a JSON array of tasks in execution order. \
                            Each task has: description, agent (the role of the agent \
                            that owns it), tools."
                .to_string(),
        }
    }

    pub fn compiler() -> PromptTemplate {
        PromptTemplate {
            name: "compiler".to_string(),
            version: "1.0.0".to_string(),
            system: PERSONA.to_string(),
            user_template: "Task: {{task}}\n\n\
                            Crew configuration:\n{{context}}\n\n\
                            Emit main.py, tasks.py and agents/agents.json. Wrap each file \
                            as `### <path> ###` ... `### END <path> ###`, with paths \
                            relative to the project directory."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn render_substitutes_every_placeholder() {
        let template = library::agent_list();
        let rendered = template
            .render(&vars(&[("task", "Generate agent list."), ("context", "{\"name\":\"todo\"}")]))
            .unwrap();

        assert!(rendered.starts_with("Task: Generate agent list."));
        assert!(rendered.contains("{\"name\":\"todo\"}"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn render_does_not_rescan_substituted_values() {
        let template = library::project_definition();
        let rendered = template
            .render(&vars(&[("task", "t"), ("context", "literal {{task}}")]))
            .unwrap();

        assert!(rendered.contains("literal {{task}}"));
    }

    #[test]
    fn render_fails_on_missing_variable() {
        let template = library::compiler();
        let result = template.render(&vars(&[("task", "t")]));

        assert!(matches!(result, Err(AgentError::TemplateError(msg)) if msg.contains("context")));
    }

    #[test]
    fn render_system_uses_persona() {
        let template = library::task_list();
        let system = template
            .render_system(&vars(&[("role", "Organizer"), ("goal", "Plan"), ("backstory", "Tidy")]))
            .unwrap();

        assert_eq!(system, "You are the Organizer.\nGoal: Plan\nBackstory: Tidy");
    }

    #[test]
    fn every_stage_has_a_named_template() {
        for stage in PipelineStage::ALL {
            assert_eq!(library::for_stage(stage).name, stage.to_string());
        }
    }
}
