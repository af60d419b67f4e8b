//! JSON-RPC 2.0 envelope and method parameter types.
//!
//! The shell drives the core with `process_message` and `ping`; the
//! core calls back out with `llm_call` and `execute_tool`. Request ids
//! are opaque [`serde_json::Value`]s on the inbound side (the shell
//! picks them) and monotonically increasing integers on the callback
//! side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use picoclaw_types::audit::AuditEntry;
use picoclaw_types::auth::{Grant, PolicyEntry};
use picoclaw_types::guardrails::{Guardrails, HaltReason};
use picoclaw_types::message::{Message, ToolDefinition};
use picoclaw_types::routing::{AgentBinding, DmScope, RouteInput};

/// JSON-RPC parse error.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC invalid request.
pub const INVALID_REQUEST: i32 = -32600;
/// JSON-RPC method not found.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC internal error (also used for invalid params, with the
/// cause carried in `data`).
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,
    /// Request identifier.
    #[serde(default)]
    pub id: Value,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default = "default_params")]
    pub params: Value,
}

fn default_params() -> Value {
    Value::Object(serde_json::Map::new())
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: Value, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,
    /// Identifier of the request this answers.
    #[serde(default)]
    pub id: Value,
    /// Successful result (mutually exclusive with `error`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error result (mutually exclusive with `result`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn failure(id: Value, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Parameters of a shell -> core `process_message` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMessageParams {
    /// Where the message came from.
    pub route_input: RouteInput,

    /// The user's message text.
    pub content: String,

    /// Ordered agent bindings for route resolution.
    #[serde(default)]
    pub bindings: Vec<AgentBinding>,

    /// Agent used when no binding matches.
    #[serde(default)]
    pub default_agent: String,

    /// Session-key granularity for direct peers.
    #[serde(default)]
    pub dm_scope: DmScope,

    /// Tools to advertise on model calls.
    #[serde(default)]
    pub tool_definitions: Vec<ToolDefinition>,

    /// Iteration fuel; values <= 0 fall back to 10.
    #[serde(default)]
    pub max_iterations: i64,

    /// Opaque correlation id echoed into callbacks and audit entries.
    pub request_id: String,

    /// Ordered tool policy; empty means everything requires a grant.
    #[serde(default)]
    pub policy: Vec<PolicyEntry>,

    /// Standing grants.
    #[serde(default)]
    pub grants: Vec<Grant>,

    /// Campaign limits; absent or zeroed means unbounded.
    #[serde(default)]
    pub guardrails: Option<Guardrails>,

    /// When positive, compact the stored session down to this many
    /// retained messages after the request.
    #[serde(default)]
    pub summary_keep_last: u64,
}

impl ProcessMessageParams {
    /// The effective iteration fuel (default 10 when unset or <= 0).
    pub fn effective_max_iterations(&self) -> u64 {
        if self.max_iterations <= 0 {
            10
        } else {
            self.max_iterations as u64
        }
    }
}

/// Result of a `process_message` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMessageResult {
    /// Final assistant text (or a halt/error sentinel).
    pub content: String,

    /// Agent that handled the request.
    pub agent_id: String,

    /// Session the request ran under.
    pub session_key: String,

    /// The request's full audit chain.
    pub audit_log: Vec<AuditEntry>,

    /// Guardrail halt reason, when one tripped.
    pub halt_reason: Option<HaltReason>,
}

/// Parameters of a core -> shell `llm_call` callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCallParams {
    /// The model context window.
    pub messages: Vec<Message>,

    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,

    /// Agent issuing the call.
    pub agent_id: String,

    /// Correlation id of the enclosing request.
    pub request_id: String,
}

/// Parameters of a core -> shell `execute_tool` callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteToolParams {
    /// Tool to execute.
    pub tool_name: String,

    /// Opaque JSON arguments from the model.
    pub arguments: String,

    /// Agent on whose behalf the tool runs.
    pub agent_id: String,

    /// JSON text encoding of the authorizing [`Grant`]; the shell must
    /// refuse empty or tampered proofs.
    pub grant_proof: String,

    /// Correlation id of the enclosing request.
    pub request_id: String,
}

/// Result of a `ping` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResult {
    /// Always `"ok"`.
    pub status: String,
    /// Core version.
    pub version: String,
}

impl PingResult {
    /// The canonical healthy reply.
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(json!(1), "ping", json!({}));
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains("\"jsonrpc\":\"2.0\""));
        assert!(text.contains("\"id\":1"));
        assert!(text.contains("\"method\":\"ping\""));
    }

    #[test]
    fn request_default_params() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#).unwrap();
        assert!(req.params.is_object());
    }

    #[test]
    fn response_success_skips_error() {
        let resp = JsonRpcResponse::success(json!(1), json!({"status": "ok"}));
        let text = serde_json::to_string(&resp).unwrap();
        assert!(!text.contains("error"));
    }

    #[test]
    fn response_failure_carries_code_and_data() {
        let resp = JsonRpcResponse::failure(
            json!(2),
            METHOD_NOT_FOUND,
            "method not found",
            Some(json!("frobnicate")),
        );
        let text = serde_json::to_string(&resp).unwrap();
        let back: JsonRpcResponse = serde_json::from_str(&text).unwrap();
        let err = back.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.data, Some(json!("frobnicate")));
        assert!(back.result.is_none());
    }

    #[test]
    fn process_message_params_minimal() {
        let params: ProcessMessageParams = serde_json::from_value(json!({
            "route_input": {"channel": "telegram"},
            "content": "hello",
            "request_id": "req-1"
        }))
        .unwrap();
        assert!(params.bindings.is_empty());
        assert!(params.policy.is_empty());
        assert!(params.grants.is_empty());
        assert!(params.guardrails.is_none());
        assert_eq!(params.dm_scope, DmScope::Main);
        assert_eq!(params.effective_max_iterations(), 10);
    }

    #[test]
    fn max_iterations_clamps_to_default() {
        let mut params: ProcessMessageParams = serde_json::from_value(json!({
            "route_input": {"channel": "t"},
            "content": "x",
            "request_id": "r"
        }))
        .unwrap();
        params.max_iterations = -3;
        assert_eq!(params.effective_max_iterations(), 10);
        params.max_iterations = 4;
        assert_eq!(params.effective_max_iterations(), 4);
    }

    #[test]
    fn process_message_result_roundtrip() {
        let result = ProcessMessageResult {
            content: "done".into(),
            agent_id: "main".into(),
            session_key: "agent:main:main".into(),
            audit_log: vec![],
            halt_reason: Some(HaltReason::BudgetExhausted),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["halt_reason"], "budget_exhausted");
        let back: ProcessMessageResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.content, "done");
    }

    #[test]
    fn halt_reason_absent_encodes_null() {
        let result = ProcessMessageResult {
            content: "ok".into(),
            agent_id: "main".into(),
            session_key: "agent:main:main".into(),
            audit_log: vec![],
            halt_reason: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["halt_reason"].is_null());
    }

    #[test]
    fn ping_result_ok() {
        let ping = PingResult::ok();
        assert_eq!(ping.status, "ok");
        assert!(!ping.version.is_empty());
    }
}
