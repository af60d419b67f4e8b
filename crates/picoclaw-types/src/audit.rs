//! Audit events and hash-chained audit entries.
//!
//! Every decision the core takes is journaled as an [`AuditEntry`]
//! whose `hash` covers the entry fields plus the previous entry's hash,
//! making insertion, deletion, or mutation anywhere but the tail
//! detectable. Chain construction and validation live in
//! `picoclaw-core`; this module defines the wire shape.

use serde::{Deserialize, Serialize};

/// A journaled decision, tagged by kind with one text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A route was resolved for an inbound message.
    RouteResolved(String),
    /// A tool call passed authorization.
    ToolAuthorized(String),
    /// A tool call was refused.
    ToolDenied(String),
    /// An authorized tool call was executed.
    ToolExecuted(String),
    /// A model call was issued (or failed before completing).
    LlmCallStarted(String),
    /// A model call completed.
    LlmCallCompleted(String),
    /// A new session was created.
    SessionCreated(String),
    /// A request finished processing.
    MessageProcessed(String),
    /// Metering observation from the aperture layer.
    ApertureMetering(String),
    /// External policy-engine (cerbos) decision record.
    CerbosDecision(String),
}

impl AuditEvent {
    /// Snake-case tag of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::RouteResolved(_) => "route_resolved",
            AuditEvent::ToolAuthorized(_) => "tool_authorized",
            AuditEvent::ToolDenied(_) => "tool_denied",
            AuditEvent::ToolExecuted(_) => "tool_executed",
            AuditEvent::LlmCallStarted(_) => "llm_call_started",
            AuditEvent::LlmCallCompleted(_) => "llm_call_completed",
            AuditEvent::SessionCreated(_) => "session_created",
            AuditEvent::MessageProcessed(_) => "message_processed",
            AuditEvent::ApertureMetering(_) => "aperture_metering",
            AuditEvent::CerbosDecision(_) => "cerbos_decision",
        }
    }

    /// The text payload carried by this event.
    pub fn payload(&self) -> &str {
        match self {
            AuditEvent::RouteResolved(p)
            | AuditEvent::ToolAuthorized(p)
            | AuditEvent::ToolDenied(p)
            | AuditEvent::ToolExecuted(p)
            | AuditEvent::LlmCallStarted(p)
            | AuditEvent::LlmCallCompleted(p)
            | AuditEvent::SessionCreated(p)
            | AuditEvent::MessageProcessed(p)
            | AuditEvent::ApertureMetering(p)
            | AuditEvent::CerbosDecision(p) => p,
        }
    }
}

/// One link in the hash chain.
///
/// `hash` is SHA-256 (hex) over the "|"-joined canonical encoding of
/// `sequence`, `timestamp`, the event kind and payload, `agent_id`,
/// `session_key`, `prev_hash`, and `request_id`. Entry 0 carries an
/// empty `prev_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the log, starting at 0.
    pub sequence: u64,

    /// When the entry was appended (unix ms).
    pub timestamp: i64,

    /// The journaled event.
    pub event: AuditEvent,

    /// Agent the decision concerned.
    pub agent_id: String,

    /// Session the decision concerned.
    pub session_key: String,

    /// Hash of the previous entry ("" for entry 0).
    pub prev_hash: String,

    /// Correlation id of the request that produced the entry.
    pub request_id: String,

    /// SHA-256 hex digest binding this entry to its predecessor.
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_tags() {
        assert_eq!(AuditEvent::RouteResolved("x".into()).kind(), "route_resolved");
        assert_eq!(
            AuditEvent::LlmCallCompleted("x".into()).kind(),
            "llm_call_completed"
        );
        assert_eq!(
            AuditEvent::CerbosDecision("x".into()).kind(),
            "cerbos_decision"
        );
    }

    #[test]
    fn event_payload_accessor() {
        let e = AuditEvent::ToolDenied("no grant".into());
        assert_eq!(e.payload(), "no grant");
    }

    #[test]
    fn event_serde_adjacent_tagging() {
        let e = AuditEvent::ToolExecuted("tool 'read_file' executed".into());
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""kind":"tool_executed""#));
        assert!(json.contains(r#""payload":"tool 'read_file' executed""#));
        let back: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn serde_kind_matches_accessor_for_all_variants() {
        let variants = [
            AuditEvent::RouteResolved(String::new()),
            AuditEvent::ToolAuthorized(String::new()),
            AuditEvent::ToolDenied(String::new()),
            AuditEvent::ToolExecuted(String::new()),
            AuditEvent::LlmCallStarted(String::new()),
            AuditEvent::LlmCallCompleted(String::new()),
            AuditEvent::SessionCreated(String::new()),
            AuditEvent::MessageProcessed(String::new()),
            AuditEvent::ApertureMetering(String::new()),
            AuditEvent::CerbosDecision(String::new()),
        ];
        for v in variants {
            let json = serde_json::to_value(&v).unwrap();
            assert_eq!(json["kind"], v.kind());
        }
    }

    #[test]
    fn entry_serde_roundtrip() {
        let entry = AuditEntry {
            sequence: 3,
            timestamp: 1_700_000_000_123,
            event: AuditEvent::MessageProcessed("completed".into()),
            agent_id: "main".into(),
            session_key: "agent:main:main".into(),
            prev_hash: "abc123".into(),
            request_id: "req-7".into(),
            hash: "def456".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
