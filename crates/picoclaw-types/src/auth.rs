//! Tool authorization policy, grants, and decisions.
//!
//! A policy is an ordered list of [`PolicyEntry`]s with first-match
//! semantics; tools with no entry default to
//! [`AuthLevel::RequiresGrant`]. A [`Grant`] is a stamped, agent-scoped
//! token for one tool name; authorization either produces a grant as
//! proof or a denial with a reason.

use serde::{Deserialize, Serialize};

/// Authorization level for a tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthLevel {
    /// Execute without a grant; a fresh grant is minted as proof.
    AlwaysAllowed,
    /// Execute only with a matching grant (the default).
    #[default]
    RequiresGrant,
    /// Never execute.
    AlwaysDenied,
}

/// One policy rule. First matching `tool_name` wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Tool the rule applies to.
    pub tool_name: String,

    /// Level assigned to the tool.
    pub level: AuthLevel,
}

impl PolicyEntry {
    /// Create a policy rule.
    pub fn new(tool_name: impl Into<String>, level: AuthLevel) -> Self {
        Self {
            tool_name: tool_name.into(),
            level,
        }
    }
}

/// An agent-scoped authorization token for a specific tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Tool this grant covers.
    pub tool_name: String,

    /// Agent this grant covers.
    pub agent_id: String,

    /// When the grant was issued (unix ms).
    #[serde(default)]
    pub issued_at: i64,
}

impl Grant {
    /// Create a grant stamped at `issued_at`.
    pub fn new(tool_name: impl Into<String>, agent_id: impl Into<String>, issued_at: i64) -> Self {
        Self {
            tool_name: tool_name.into(),
            agent_id: agent_id.into(),
            issued_at,
        }
    }

    /// Whether this grant covers the given tool + agent pair.
    pub fn covers(&self, tool_name: &str, agent_id: &str) -> bool {
        self.tool_name == tool_name && self.agent_id == agent_id
    }
}

/// The outcome of authorizing one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthDecision {
    /// Execution may proceed; the grant is the proof forwarded to the
    /// tool runtime.
    Authorized {
        /// Proof of authorization.
        grant: Grant,
    },
    /// Execution is refused.
    Denied {
        /// Why the call was refused.
        reason: String,
    },
}

impl AuthDecision {
    /// Whether this decision permits execution.
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthDecision::Authorized { .. })
    }
}
