//! Tool authorization.
//!
//! Pure decision function mapping (tool, agent, policy, grants) to an
//! [`AuthDecision`]. Policy entries are scanned in order and the first
//! matching tool name wins; tools without an entry default to
//! [`AuthLevel::RequiresGrant`].

use picoclaw_types::auth::{AuthDecision, AuthLevel, Grant, PolicyEntry};

/// Look up the effective level for a tool. First match wins; no match
/// means [`AuthLevel::RequiresGrant`].
pub fn lookup_level(policy: &[PolicyEntry], tool_name: &str) -> AuthLevel {
    policy
        .iter()
        .find(|entry| entry.tool_name == tool_name)
        .map(|entry| entry.level)
        .unwrap_or(AuthLevel::RequiresGrant)
}

/// Authorize one tool call.
///
/// - `AlwaysDenied` tools are denied outright.
/// - `AlwaysAllowed` tools get a fresh grant stamped at `timestamp`.
/// - `RequiresGrant` tools pass only with a grant covering the
///   (tool, agent) pair.
pub fn authorize(
    tool_name: &str,
    agent_id: &str,
    policy: &[PolicyEntry],
    grants: &[Grant],
    timestamp: i64,
) -> AuthDecision {
    match lookup_level(policy, tool_name) {
        AuthLevel::AlwaysDenied => AuthDecision::Denied {
            reason: format!("tool '{tool_name}' is always denied"),
        },
        AuthLevel::AlwaysAllowed => AuthDecision::Authorized {
            grant: Grant::new(tool_name, agent_id, timestamp),
        },
        AuthLevel::RequiresGrant => match grants.iter().find(|g| g.covers(tool_name, agent_id)) {
            Some(grant) => AuthDecision::Authorized {
                grant: grant.clone(),
            },
            None => AuthDecision::Denied {
                reason: format!("no grant for tool '{tool_name}' agent '{agent_id}'"),
            },
        },
    }
}

/// Authorize a batch of tool names. The output has exactly one decision
/// per input name, in order.
pub fn authorize_many(
    tool_names: &[&str],
    agent_id: &str,
    policy: &[PolicyEntry],
    grants: &[Grant],
    timestamp: i64,
) -> Vec<AuthDecision> {
    tool_names
        .iter()
        .map(|name| authorize(name, agent_id, policy, grants, timestamp))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> Vec<PolicyEntry> {
        vec![
            PolicyEntry::new("exec_command", AuthLevel::AlwaysDenied),
            PolicyEntry::new("web_search", AuthLevel::AlwaysAllowed),
        ]
    }

    #[test]
    fn always_denied_is_denied() {
        let decision = authorize("exec_command", "a", &policy(), &[], 1);
        assert_eq!(
            decision,
            AuthDecision::Denied {
                reason: "tool 'exec_command' is always denied".into()
            }
        );
    }

    #[test]
    fn always_allowed_mints_fresh_grant() {
        let decision = authorize("web_search", "a", &policy(), &[], 42);
        match decision {
            AuthDecision::Authorized { grant } => {
                assert_eq!(grant.tool_name, "web_search");
                assert_eq!(grant.agent_id, "a");
                assert_eq!(grant.issued_at, 42);
            }
            AuthDecision::Denied { reason } => panic!("unexpected denial: {reason}"),
        }
    }

    #[test]
    fn unlisted_tool_without_grant_is_denied() {
        let decision = authorize("write_file", "a", &policy(), &[], 1);
        assert_eq!(
            decision,
            AuthDecision::Denied {
                reason: "no grant for tool 'write_file' agent 'a'".into()
            }
        );
    }

    #[test]
    fn unlisted_tool_with_matching_grant_is_authorized() {
        let grants = vec![Grant::new("write_file", "a", 7)];
        let decision = authorize("write_file", "a", &policy(), &grants, 99);
        match decision {
            AuthDecision::Authorized { grant } => {
                // The existing grant is returned, not a fresh one.
                assert_eq!(grant.issued_at, 7);
            }
            AuthDecision::Denied { reason } => panic!("unexpected denial: {reason}"),
        }
    }

    #[test]
    fn grant_for_other_agent_does_not_apply() {
        let grants = vec![Grant::new("write_file", "other", 7)];
        let decision = authorize("write_file", "a", &policy(), &grants, 1);
        assert!(!decision.is_authorized());
    }

    #[test]
    fn first_policy_entry_wins() {
        let conflicting = vec![
            PolicyEntry::new("web_search", AuthLevel::AlwaysDenied),
            PolicyEntry::new("web_search", AuthLevel::AlwaysAllowed),
        ];
        let decision = authorize("web_search", "a", &conflicting, &[], 1);
        assert!(!decision.is_authorized());
    }

    #[test]
    fn always_denied_ignores_grants() {
        let grants = vec![Grant::new("exec_command", "a", 7)];
        let decision = authorize("exec_command", "a", &policy(), &grants, 1);
        assert!(!decision.is_authorized());
    }

    #[test]
    fn authorize_many_preserves_length_and_order() {
        let names = ["exec_command", "web_search", "write_file"];
        let decisions = authorize_many(&names, "a", &policy(), &[], 1);
        assert_eq!(decisions.len(), names.len());
        assert!(!decisions[0].is_authorized());
        assert!(decisions[1].is_authorized());
        assert!(!decisions[2].is_authorized());
    }

    #[test]
    fn authorize_many_empty() {
        assert!(authorize_many(&[], "a", &policy(), &[], 1).is_empty());
    }
}
