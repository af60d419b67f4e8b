//! Deterministic route resolution.
//!
//! Maps an inbound message origin to an agent and session key via a
//! seven-level cascade. Each level scans the bindings in insertion
//! order and the first satisfied predicate wins; the unconditional
//! `Default` level terminates the cascade, so resolution is total.
//!
//! Cascade order: peer, parent peer, guild, team, account, channel
//! wildcard, default.

use tracing::debug;

use picoclaw_types::routing::{
    AgentBinding, BindingMatch, DmScope, MatchReason, ResolvedRoute, RouteInput, RoutePeer,
};

/// Resolve an inbound message to an agent and session key.
///
/// Pure and total: identical inputs always yield identical routes, and
/// the default level guarantees a result.
pub fn resolve_route(
    bindings: &[AgentBinding],
    default_agent_id: &str,
    scope: DmScope,
    input: &RouteInput,
) -> ResolvedRoute {
    let levels: [(MatchReason, MatchFn); 6] = [
        (MatchReason::Peer, matches_peer),
        (MatchReason::ParentPeer, matches_parent_peer),
        (MatchReason::Guild, matches_guild),
        (MatchReason::Team, matches_team),
        (MatchReason::Account, matches_account),
        (MatchReason::ChannelWildcard, matches_channel_wildcard),
    ];

    for (reason, predicate) in levels {
        for binding in bindings {
            if predicate(&binding.match_criteria, input) {
                debug!(
                    agent_id = %binding.agent_id,
                    channel = %input.channel,
                    matched_by = reason.as_str(),
                    "binding matched"
                );
                return make_route(&binding.agent_id, scope, input, reason);
            }
        }
    }

    debug!(
        agent_id = %default_agent_id,
        channel = %input.channel,
        "no binding matched, using default agent"
    );
    make_route(default_agent_id, scope, input, MatchReason::Default)
}

type MatchFn = fn(&BindingMatch, &RouteInput) -> bool;

fn peers_equal(a: &RoutePeer, b: &RoutePeer) -> bool {
    a.kind == b.kind && a.id == b.id
}

fn channels_match(m: &BindingMatch, input: &RouteInput) -> bool {
    m.channel == input.channel
}

fn matches_peer(m: &BindingMatch, input: &RouteInput) -> bool {
    match (&m.peer, &input.peer) {
        (Some(p), Some(q)) => peers_equal(p, q) && channels_match(m, input),
        _ => false,
    }
}

fn matches_parent_peer(m: &BindingMatch, input: &RouteInput) -> bool {
    match (&m.peer, &input.parent_peer) {
        (Some(p), Some(q)) => peers_equal(p, q) && channels_match(m, input),
        _ => false,
    }
}

fn matches_guild(m: &BindingMatch, input: &RouteInput) -> bool {
    !m.guild_id.is_empty() && m.guild_id == input.guild_id && channels_match(m, input)
}

fn matches_team(m: &BindingMatch, input: &RouteInput) -> bool {
    !m.team_id.is_empty() && m.team_id == input.team_id && channels_match(m, input)
}

fn matches_account(m: &BindingMatch, input: &RouteInput) -> bool {
    !m.account_is_wildcard()
        && m.account_id == input.account_id
        && channels_match(m, input)
        && m.peer.is_none()
}

fn matches_channel_wildcard(m: &BindingMatch, input: &RouteInput) -> bool {
    channels_match(m, input)
        && m.account_is_wildcard()
        && m.peer.is_none()
        && m.guild_id.is_empty()
        && m.team_id.is_empty()
}

fn make_route(
    agent_id: &str,
    scope: DmScope,
    input: &RouteInput,
    matched_by: MatchReason,
) -> ResolvedRoute {
    ResolvedRoute {
        agent_id: agent_id.to_string(),
        channel: input.channel.clone(),
        account_id: input.account_id.clone(),
        session_key: session_key(agent_id, scope, input),
        main_session_key: main_session_key(agent_id),
        matched_by,
    }
}

/// The agent's main session key.
pub fn main_session_key(agent_id: &str) -> String {
    format!("agent:{agent_id}:main")
}

/// Session key for the resolved agent and origin.
///
/// Direct peers are keyed by [`DmScope`]; group peers always get a
/// channel-scoped group key; peerless input shares the main session.
pub fn session_key(agent_id: &str, scope: DmScope, input: &RouteInput) -> String {
    let Some(peer) = &input.peer else {
        return main_session_key(agent_id);
    };

    if !peer.is_direct() {
        return format!("agent:{agent_id}:{}:group:{}", input.channel, peer.id);
    }

    match scope {
        DmScope::Main => main_session_key(agent_id),
        DmScope::PerPeer => format!("agent:{agent_id}:direct:{}", peer.id),
        DmScope::PerChannelPeer => {
            format!("agent:{agent_id}:{}:direct:{}", input.channel, peer.id)
        }
        DmScope::PerAccountChannelPeer => format!(
            "agent:{agent_id}:{}:{}:direct:{}",
            input.account_id, input.channel, peer.id
        ),
    }
}
