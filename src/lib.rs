//! Personal assistant state for AI agents, served over MCP.
//!
//! aide is an [MCP](https://modelcontextprotocol.io/) server that keeps an
//! assistant's working memory in plain files the user can read and edit:
//!
//! | Document | Format | Holds |
//! |----------|--------|-------|
//! | `state.yaml` | YAML | Goals with key results, ideas, settings |
//! | `profile.yaml` | YAML | Categorized facts about the user |
//! | `drawings/*.excalidraw` | JSON | Excalidraw diagrams |
//! | `design-system.yaml` | YAML | Style defaults for new drawing elements |
//! | `notes/**/*.md` | Markdown | Free-form notes |
//!
//! # Architecture
//!
//! - **Documents**: a generic [`store::DocumentStore`] does get / save / deep-merge
//!   update with schema validation and default stripping, writing atomically
//! - **Drawings**: element parsing, legacy library normalization, collision-free
//!   merging, summaries, and token-saving compression
//! - **Collaborators**: notes on disk, a REST calendar, and external commands
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`store`]: Generic YAML document store
//! - [`state`] / [`profile`]: The two YAML documents and their operations
//! - [`drawing`]: Excalidraw element engine and drawing directory
//! - [`notes`], [`calendar`], [`commands`]: External collaborators
//! - [`audit`]: Append-only JSONL audit trail
//! - [`tools`]: MCP tool handler

pub mod audit;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod drawing;
pub mod error;
pub mod notes;
pub mod profile;
pub mod server;
pub mod services;
pub mod state;
pub mod store;
pub mod tools;
