// Crew agent system
//
// This module contains the four-agent crew that turns a project idea into
// a crew application, and the pipeline seam the conversation drives.

pub mod crew;
pub mod errors;
pub mod pipeline;
pub mod prompts;
pub mod types;

// Re-export main types
pub use crew::{Crew, CrewAgent};
pub use errors::{AgentError, AgentResult};
pub use pipeline::{Pipeline, PipelineStage};
pub use types::{AgentDescriptor, TaskDescriptor};
