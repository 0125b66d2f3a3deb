//! Crewforge API Library
//!
//! This library provides the core functionality for the Crewforge API:
//! the conversation that walks a user from a project idea to a compiled
//! crew, the LLM-backed crew itself, and the adapters for the chat backend,
//! GitHub and the local workspace.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
