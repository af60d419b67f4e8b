//! # picoclaw-types
//!
//! Wire data model for the PicoClaw decision core.
//!
//! This crate is the foundation of the dependency graph -- all other
//! picoclaw crates depend on it. It contains:
//!
//! - **[`error`]** -- [`PicoClawError`] and the shared `Result` alias
//! - **[`message`]** -- roles, messages, tool calls, model responses
//! - **[`routing`]** -- route inputs, bindings, resolved routes
//! - **[`auth`]** -- policy entries, grants, authorization decisions
//! - **[`audit`]** -- audit events and hash-chained entries
//! - **[`session`]** -- append-only conversation sessions
//! - **[`guardrails`]** -- campaign limits and halt reasons

pub mod audit;
pub mod auth;
pub mod error;
pub mod guardrails;
pub mod message;
pub mod routing;
pub mod session;

pub use audit::{AuditEntry, AuditEvent};
pub use auth::{AuthDecision, AuthLevel, Grant, PolicyEntry};
pub use error::{PicoClawError, Result};
pub use guardrails::{Guardrails, HaltReason};
pub use message::{
    FunctionCall, LlmResponse, Message, Role, ToolCall, ToolDefinition, ToolResult, UsageInfo,
};
pub use routing::{
    AgentBinding, BindingMatch, DmScope, MatchReason, ResolvedRoute, RouteInput, RoutePeer,
};
pub use session::Session;
