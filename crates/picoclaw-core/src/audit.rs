//! Append-only hash-chained audit log.
//!
//! Each appended entry records the SHA-256 digest of its own canonical
//! encoding, which includes the previous entry's digest. Producers only
//! append; [`AuditLog::chain_valid`] re-derives every digest to detect
//! tampering after the fact.

use sha2::{Digest, Sha256};

use picoclaw_types::audit::{AuditEntry, AuditEvent};

/// An append-only journal of decisions for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log, yielding its entries.
    pub fn into_entries(self) -> Vec<AuditEntry> {
        self.entries
    }

    /// Append one entry. Sequence and hash linkage are derived from the
    /// current tail; entry 0 links to the empty string.
    pub fn append(
        &mut self,
        timestamp: i64,
        event: AuditEvent,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        let sequence = self.entries.len() as u64;
        let prev_hash = self
            .entries
            .last()
            .map(|entry| entry.hash.clone())
            .unwrap_or_default();
        let hash = entry_hash(
            sequence,
            timestamp,
            &event,
            agent_id,
            session_key,
            &prev_hash,
            request_id,
        );
        self.entries.push(AuditEntry {
            sequence,
            timestamp,
            event,
            agent_id: agent_id.to_string(),
            session_key: session_key.to_string(),
            prev_hash,
            request_id: request_id.to_string(),
            hash,
        });
    }

    /// Record a resolved route.
    pub fn log_route(
        &mut self,
        timestamp: i64,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        self.append(
            timestamp,
            AuditEvent::RouteResolved(payload.to_string()),
            agent_id,
            session_key,
            request_id,
        );
    }

    /// Record a tool authorization decision.
    pub fn log_tool_auth(
        &mut self,
        timestamp: i64,
        authorized: bool,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        let event = if authorized {
            AuditEvent::ToolAuthorized(payload.to_string())
        } else {
            AuditEvent::ToolDenied(payload.to_string())
        };
        self.append(timestamp, event, agent_id, session_key, request_id);
    }

    /// Record an executed tool call.
    pub fn log_tool_exec(
        &mut self,
        timestamp: i64,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        self.append(
            timestamp,
            AuditEvent::ToolExecuted(payload.to_string()),
            agent_id,
            session_key,
            request_id,
        );
    }

    /// Record a model call; `completed` selects completed vs started.
    pub fn log_llm_call(
        &mut self,
        timestamp: i64,
        completed: bool,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        let event = if completed {
            AuditEvent::LlmCallCompleted(payload.to_string())
        } else {
            AuditEvent::LlmCallStarted(payload.to_string())
        };
        self.append(timestamp, event, agent_id, session_key, request_id);
    }

    /// Record session creation.
    pub fn log_session_created(
        &mut self,
        timestamp: i64,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        self.append(
            timestamp,
            AuditEvent::SessionCreated(payload.to_string()),
            agent_id,
            session_key,
            request_id,
        );
    }

    /// Record the end of request processing.
    pub fn log_message_processed(
        &mut self,
        timestamp: i64,
        payload: &str,
        agent_id: &str,
        session_key: &str,
        request_id: &str,
    ) {
        self.append(
            timestamp,
            AuditEvent::MessageProcessed(payload.to_string()),
            agent_id,
            session_key,
            request_id,
        );
    }

    /// Validate the whole chain: contiguous sequences from 0, each
    /// `prev_hash` equal to the predecessor's digest, and every stored
    /// digest matching a recomputation. Empty and singleton logs are
    /// valid (a singleton must carry sequence 0 and an empty
    /// `prev_hash`, which the recomputation check enforces).
    pub fn chain_valid(&self) -> bool {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.sequence != i as u64 {
                return false;
            }
            let expected_prev = if i == 0 {
                ""
            } else {
                self.entries[i - 1].hash.as_str()
            };
            if entry.prev_hash != expected_prev {
                return false;
            }
            let recomputed = entry_hash(
                entry.sequence,
                entry.timestamp,
                &entry.event,
                &entry.agent_id,
                &entry.session_key,
                &entry.prev_hash,
                &entry.request_id,
            );
            if entry.hash != recomputed {
                return false;
            }
        }
        true
    }
}

/// SHA-256 hex digest of an entry's canonical "|"-joined encoding.
fn entry_hash(
    sequence: u64,
    timestamp: i64,
    event: &AuditEvent,
    agent_id: &str,
    session_key: &str,
    prev_hash: &str,
    request_id: &str,
) -> String {
    let canonical = format!(
        "{sequence}|{timestamp}|{}|{}|{agent_id}|{session_key}|{prev_hash}|{request_id}",
        event.kind(),
        event.payload(),
    );
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Hex-encode a byte slice.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
