//! Routing inputs, bindings, and resolved routes.
//!
//! A [`RouteInput`] describes where a message came from (channel,
//! account, peer, guild/team). An ordered list of [`AgentBinding`]s maps
//! origins to agents; resolution provenance is recorded as a
//! [`MatchReason`] on the resulting [`ResolvedRoute`].

use serde::{Deserialize, Serialize};

/// Session-key granularity for direct peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DmScope {
    /// All direct messages share the agent's main session.
    #[default]
    Main,
    /// One session per peer id.
    PerPeer,
    /// One session per channel + peer id.
    PerChannelPeer,
    /// One session per account + channel + peer id.
    PerAccountChannelPeer,
}

/// A conversation peer within a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePeer {
    /// Peer kind: "direct", "group", etc.
    pub kind: String,

    /// Channel-scoped peer identifier.
    pub id: String,
}

impl RoutePeer {
    /// Create a peer.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Whether this peer is a direct (one-on-one) conversation.
    pub fn is_direct(&self) -> bool {
        self.kind == "direct"
    }
}

/// The origin of an inbound message, as supplied by the shell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteInput {
    /// Channel name (e.g. "telegram", "slack", "discord").
    #[serde(default)]
    pub channel: String,

    /// Account identifier within the channel.
    #[serde(default)]
    pub account_id: String,

    /// Guild identifier (Discord-style servers), "" when absent.
    #[serde(default)]
    pub guild_id: String,

    /// Team identifier (Slack-style workspaces), "" when absent.
    #[serde(default)]
    pub team_id: String,

    /// The conversation peer, when known.
    #[serde(default)]
    pub peer: Option<RoutePeer>,

    /// The enclosing peer (e.g. the channel a thread lives in).
    #[serde(default)]
    pub parent_peer: Option<RoutePeer>,
}

/// Matching predicate for a binding. Same shape as [`RouteInput`];
/// `"*"` (or "") in `account_id` matches any account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingMatch {
    /// Channel the binding applies to.
    #[serde(default)]
    pub channel: String,

    /// Account filter; "" or "*" is a wildcard.
    #[serde(default)]
    pub account_id: String,

    /// Guild filter; "" matches nothing at the guild level.
    #[serde(default)]
    pub guild_id: String,

    /// Team filter; "" matches nothing at the team level.
    #[serde(default)]
    pub team_id: String,

    /// Exact-peer filter.
    #[serde(default)]
    pub peer: Option<RoutePeer>,

    /// Parent-peer filter.
    #[serde(default)]
    pub parent_peer: Option<RoutePeer>,
}

impl BindingMatch {
    /// Whether the account filter is a wildcard ("" or "*").
    pub fn account_is_wildcard(&self) -> bool {
        self.account_id.is_empty() || self.account_id == "*"
    }
}

/// A rule mapping a message origin to an agent. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentBinding {
    /// Agent to route to when the rule matches.
    pub agent_id: String,

    /// Match criteria.
    #[serde(rename = "match", default)]
    pub match_criteria: BindingMatch,
}

/// Which cascade level produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Exact peer match.
    Peer,
    /// Exact parent-peer match.
    ParentPeer,
    /// Guild id match.
    Guild,
    /// Team id match.
    Team,
    /// Specific account match.
    Account,
    /// Channel-wide wildcard binding.
    ChannelWildcard,
    /// No binding matched; the default agent was used.
    Default,
}

impl MatchReason {
    /// Snake-case text form, as used in audit payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchReason::Peer => "peer",
            MatchReason::ParentPeer => "parent_peer",
            MatchReason::Guild => "guild",
            MatchReason::Team => "team",
            MatchReason::Account => "account",
            MatchReason::ChannelWildcard => "channel_wildcard",
            MatchReason::Default => "default",
        }
    }
}

/// The output of route resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    /// The agent that will handle the message.
    pub agent_id: String,

    /// Channel copied from the input.
    pub channel: String,

    /// Account copied from the input.
    pub account_id: String,

    /// Session key the conversation is stored under.
    pub session_key: String,

    /// The agent's main session key (`agent:{agent}:main`).
    pub main_session_key: String,

    /// Cascade level that produced this route.
    pub matched_by: MatchReason,
}
