//! Chat message and tool-call wire types.
//!
//! These mirror the OpenAI chat-completion shape that has become the
//! de facto interchange format: `role` + `content` messages, assistant
//! messages carrying `tool_calls`, and tool-role messages answering a
//! specific `tool_call_id`. Tool arguments and schemas are opaque JSON
//! text; the core never parses them.

use serde::{Deserialize, Serialize};

/// Role of a message author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user input (and the fallback for unknown role strings).
    #[default]
    User,
    /// Model output.
    Assistant,
    /// Instructions injected ahead of the conversation.
    System,
    /// Result of an executed tool call.
    Tool,
}

impl Role {
    /// Lowercase text form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }

    /// Parse a role from its text form. Unknown strings fall back to
    /// [`Role::User`].
    pub fn parse(s: &str) -> Self {
        match s {
            "assistant" => Role::Assistant,
            "system" => Role::System,
            "tool" => Role::Tool,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function invocation within a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The name of the function to call.
    pub name: String,

    /// The arguments as an opaque JSON document.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,

    /// The type of tool call. Currently always "function".
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,

    /// The function to invoke.
    #[serde(default)]
    pub function: Option<FunctionCall>,

    /// Denormalized function name. When `function` is present the two
    /// names agree; this field stands alone otherwise.
    #[serde(default)]
    pub name: String,
}

fn default_call_type() -> String {
    "function".into()
}

impl ToolCall {
    /// Create a function-type tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            call_type: "function".into(),
            function: Some(FunctionCall {
                name: name.clone(),
                arguments: arguments.into(),
            }),
            name,
        }
    }

    /// Effective tool name: the nested function name when present,
    /// else the denormalized field.
    pub fn tool_name(&self) -> &str {
        match &self.function {
            Some(f) if !f.name.is_empty() => &f.name,
            _ => &self.name,
        }
    }

    /// The opaque JSON arguments document ("" when absent).
    pub fn arguments(&self) -> &str {
        self.function.as_ref().map(|f| f.arguments.as_str()).unwrap_or("")
    }
}

/// Token usage reported by the model provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt: u64,

    /// Tokens in the generated completion.
    #[serde(default)]
    pub completion: u64,

    /// Total tokens (prompt + completion).
    #[serde(default)]
    pub total: u64,
}

/// A message in a conversation.
///
/// Invariants: a `Tool` message carries a non-empty `tool_call_id`; only
/// `Assistant` messages carry `tool_calls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,

    /// Text content.
    #[serde(default)]
    pub content: String,

    /// Reasoning / thinking text produced alongside the content.
    #[serde(default)]
    pub reasoning_content: String,

    /// Tool calls requested by the assistant in this message.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// For tool-role messages, the id of the call being answered.
    #[serde(default)]
    pub tool_call_id: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a tool-result message answering `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            ..Default::default()
        }
    }
}

/// The shell's reply to an `llm_call` callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text (may accompany tool calls).
    #[serde(default)]
    pub content: String,

    /// Reasoning text, when the provider surfaces it.
    #[serde(default)]
    pub reasoning_content: String,

    /// Tool calls the model wants executed, in request order.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Token accounting, when available.
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// The assistant [`Message`] this response records into the
    /// conversation.
    pub fn to_assistant_message(&self) -> Message {
        Message {
            role: Role::Assistant,
            content: self.content.clone(),
            reasoning_content: self.reasoning_content.clone(),
            tool_calls: self.tool_calls.clone(),
            tool_call_id: String::new(),
        }
    }
}

/// The shell's reply to an `execute_tool` callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Text fed back to the model.
    #[serde(default)]
    pub for_llm: String,

    /// Text suitable for direct display to the end user.
    #[serde(default)]
    pub for_user: String,

    /// Suppress user-facing output for this call.
    #[serde(default)]
    pub silent: bool,

    /// The tool ran but failed; `for_llm` carries the error text.
    #[serde(default)]
    pub is_error: bool,

    /// The tool was started asynchronously; results arrive out of band.
    #[serde(rename = "async", default)]
    pub is_async: bool,

    /// Per-call cost charged against the campaign budget.
    #[serde(default)]
    pub cost_cents: u64,
}

impl ToolResult {
    /// A successful result with the given model-facing text.
    pub fn success(for_llm: impl Into<String>) -> Self {
        Self {
            for_llm: for_llm.into(),
            ..Default::default()
        }
    }

    /// A failed result with the given error text.
    pub fn error(for_llm: impl Into<String>) -> Self {
        Self {
            for_llm: for_llm.into(),
            is_error: true,
            ..Default::default()
        }
    }
}

/// A tool the model may call, as advertised to the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,

    /// Human / model readable description.
    #[serde(default)]
    pub description: String,

    /// JSON-schema parameter document, carried as opaque text.
    #[serde(default)]
    pub parameters: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_roundtrip() {
        for role in [Role::User, Role::Assistant, Role::System, Role::Tool] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn role_unknown_parses_to_user() {
        assert_eq!(Role::parse("moderator"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let back: Role = serde_json::from_str("\"tool\"").unwrap();
        assert_eq!(back, Role::Tool);
    }

    #[test]
    fn tool_call_type_field_renamed() {
        let tc = ToolCall::new("tc1", "web_search", "{}");
        let json = serde_json::to_string(&tc).unwrap();
        assert!(json.contains(r#""type":"function""#));
        assert!(!json.contains("call_type"));
    }

    #[test]
    fn tool_call_name_prefers_function() {
        let tc = ToolCall {
            id: "tc1".into(),
            call_type: "function".into(),
            function: Some(FunctionCall {
                name: "read_file".into(),
                arguments: r#"{"path":"a.txt"}"#.into(),
            }),
            name: String::new(),
        };
        assert_eq!(tc.tool_name(), "read_file");
        assert_eq!(tc.arguments(), r#"{"path":"a.txt"}"#);
    }

    #[test]
    fn tool_call_name_falls_back_to_denormalized() {
        let tc = ToolCall {
            id: "tc1".into(),
            call_type: "function".into(),
            function: None,
            name: "web_search".into(),
        };
        assert_eq!(tc.tool_name(), "web_search");
        assert_eq!(tc.arguments(), "");
    }

    #[test]
    fn message_constructors() {
        let user = Message::user("hi");
        assert_eq!(user.role, Role::User);
        assert!(user.tool_calls.is_empty());

        let tool = Message::tool("tc9", "42");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id, "tc9");
        assert_eq!(tool.content, "42");
    }

    #[test]
    fn message_serde_roundtrip() {
        let mut msg = Message::assistant("checking");
        msg.tool_calls = vec![ToolCall::new("tc1", "web_search", r#"{"q":"rust"}"#)];
        let json = serde_json::to_string(&msg).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, restored);
    }

    #[test]
    fn message_defaults_on_missing_fields() {
        let json = r#"{"role":"user","content":"hello"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_call_id.is_empty());
        assert!(msg.reasoning_content.is_empty());
    }

    #[test]
    fn llm_response_to_assistant_message() {
        let resp = LlmResponse {
            content: "done".into(),
            reasoning_content: "thought".into(),
            tool_calls: vec![ToolCall::new("tc1", "write_file", "{}")],
            usage: Some(UsageInfo {
                prompt: 10,
                completion: 5,
                total: 15,
            }),
        };
        let msg = resp.to_assistant_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "done");
        assert_eq!(msg.tool_calls.len(), 1);
        assert!(msg.tool_call_id.is_empty());
    }

    #[test]
    fn tool_result_async_rename() {
        let json = r#"{"for_llm":"ok","async":true}"#;
        let result: ToolResult = serde_json::from_str(json).unwrap();
        assert!(result.is_async);
        let back = serde_json::to_string(&result).unwrap();
        assert!(back.contains(r#""async":true"#));
        assert!(!back.contains("is_async"));
    }

    #[test]
    fn tool_result_cost_defaults_to_zero() {
        let result: ToolResult = serde_json::from_str(r#"{"for_llm":"ok"}"#).unwrap();
        assert_eq!(result.cost_cents, 0);
        assert!(!result.is_error);
    }

    #[test]
    fn tool_result_helpers() {
        assert!(!ToolResult::success("fine").is_error);
        assert!(ToolResult::error("boom").is_error);
    }

    #[test]
    fn usage_roundtrip() {
        let usage = UsageInfo {
            prompt: 100,
            completion: 40,
            total: 140,
        };
        let json = serde_json::to_string(&usage).unwrap();
        let back: UsageInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(usage, back);
    }
}
