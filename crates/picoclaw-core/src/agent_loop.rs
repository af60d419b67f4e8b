//! Fuel-bounded agent loop state machine.
//!
//! The loop is expressed as pure transitions over a [`LoopState`]: the
//! runtime issues the actual `llm_call` / `execute_tool` callbacks and
//! feeds their results through [`step_iteration`] and the tool-call
//! bookkeeping functions here. Every decision lands in the state's
//! audit log; the iteration counter strictly increases once per model
//! call, so `max_iterations` bounds the loop.

use picoclaw_types::auth::{AuthDecision, Grant, PolicyEntry};
use picoclaw_types::message::{LlmResponse, Message, ToolCall, ToolResult};
use picoclaw_types::routing::ResolvedRoute;
use picoclaw_types::session::Session;

use crate::audit::AuditLog;
use crate::auth::authorize;
use crate::campaign::{read_only_denies, CampaignState, READ_ONLY_DENIAL};

/// Final content when the iteration budget runs out.
pub const FUEL_EXHAUSTED_SENTINEL: &str = "fuel exhausted";

/// Final content for a failed callback.
pub fn error_sentinel(message: &str) -> String {
    format!("the agent encountered an error: {message}")
}

/// All state threaded through one request.
#[derive(Debug, Clone)]
pub struct LoopState {
    /// The session, including the new user message.
    pub session: Session,

    /// Request-local audit journal.
    pub audit: AuditLog,

    /// The LLM context window for the next model call.
    pub messages: Vec<Message>,

    /// Completed model calls.
    pub iteration: u64,

    /// Agent handling the request.
    pub agent_id: String,

    /// Session the request runs under.
    pub session_key: String,

    /// Correlation id supplied by the shell.
    pub request_id: String,

    /// Campaign accounting for guardrail checks.
    pub campaign: CampaignState,

    /// When the request started (unix ms), for duration accounting.
    pub started_at_ms: i64,
}

/// Result of classifying one model response.
#[derive(Debug, Clone)]
pub enum IterationOutcome {
    /// The model produced a final text answer.
    FinalResponse {
        /// The answer text.
        content: String,
        /// State after recording the response.
        state: LoopState,
    },
    /// The model requested tool calls, to be processed in order.
    NeedsToolCalls {
        /// Requested calls, in response order.
        calls: Vec<ToolCall>,
        /// State after recording the response.
        state: LoopState,
    },
    /// The iteration budget is spent; no model call was made.
    FuelExhausted {
        /// State, untouched by this classification.
        state: LoopState,
    },
    /// A callback failed; the request completes with a partial answer.
    IterationError {
        /// Failure detail from the callback.
        message: String,
        /// State after recording the failure.
        state: LoopState,
    },
}

impl IterationOutcome {
    /// The state carried by this outcome, whatever the variant.
    pub fn into_state(self) -> LoopState {
        match self {
            IterationOutcome::FinalResponse { state, .. }
            | IterationOutcome::NeedsToolCalls { state, .. }
            | IterationOutcome::FuelExhausted { state }
            | IterationOutcome::IterationError { state, .. } => state,
        }
    }
}

/// Start a request: append the user message, build the model window,
/// and seed the audit log with the resolved route.
pub fn init_loop(
    route: &ResolvedRoute,
    mut session: Session,
    user_content: &str,
    request_id: &str,
    now_ms: i64,
) -> LoopState {
    session.add_message(Message::user(user_content));
    let messages = session.build_context();

    let mut audit = AuditLog::new();
    audit.log_route(
        now_ms,
        &format!(
            "agent '{}' matched by {} (session {})",
            route.agent_id,
            route.matched_by.as_str(),
            route.session_key
        ),
        &route.agent_id,
        &route.session_key,
        request_id,
    );

    LoopState {
        session,
        audit,
        messages,
        iteration: 0,
        agent_id: route.agent_id.clone(),
        session_key: route.session_key.clone(),
        request_id: request_id.to_string(),
        campaign: CampaignState::default(),
        started_at_ms: now_ms,
    }
}

/// Model calls left before the fuel runs out.
pub fn remaining_fuel(state: &LoopState, max_iterations: u64) -> u64 {
    max_iterations.saturating_sub(state.iteration)
}

/// Classify a model response and fold it into the state.
///
/// With fuel left, the assistant message (content, reasoning, and any
/// tool calls) is recorded into both the window and the session, the
/// completed call is audited, and the iteration counter advances. A
/// response carrying both content and tool calls keeps its content on
/// the recorded message while iteration continues.
pub fn step_iteration(
    mut state: LoopState,
    response: LlmResponse,
    fuel: u64,
    now_ms: i64,
) -> IterationOutcome {
    if fuel == 0 {
        return IterationOutcome::FuelExhausted { state };
    }

    let assistant = response.to_assistant_message();
    state.messages.push(assistant.clone());
    state.session.add_message(assistant);
    state.audit.log_llm_call(
        now_ms,
        true,
        &format!(
            "iteration {} completed with {} tool call(s)",
            state.iteration,
            response.tool_calls.len()
        ),
        &state.agent_id,
        &state.session_key,
        &state.request_id,
    );
    state.iteration += 1;

    let elapsed = minutes_between(state.started_at_ms, now_ms);
    let delta = elapsed.saturating_sub(state.campaign.elapsed_minutes);
    state.campaign = state.campaign.record_iteration(delta);

    if response.tool_calls.is_empty() {
        IterationOutcome::FinalResponse {
            content: response.content,
            state,
        }
    } else {
        IterationOutcome::NeedsToolCalls {
            calls: response.tool_calls,
            state,
        }
    }
}

/// Authorize one requested tool call and audit the decision.
///
/// `read_only` is checked before the policy: mutating tools are refused
/// with a fixed reason regardless of grants.
pub fn authorize_call(
    mut state: LoopState,
    call: &ToolCall,
    policy: &[PolicyEntry],
    grants: &[Grant],
    read_only: bool,
    now_ms: i64,
) -> (AuthDecision, LoopState) {
    let name = call.tool_name();
    let decision = if read_only && read_only_denies(name) {
        AuthDecision::Denied {
            reason: READ_ONLY_DENIAL.into(),
        }
    } else {
        authorize(name, &state.agent_id, policy, grants, now_ms)
    };

    match &decision {
        AuthDecision::Authorized { .. } => state.audit.log_tool_auth(
            now_ms,
            true,
            &format!("tool '{}' authorized for agent '{}'", name, state.agent_id),
            &state.agent_id,
            &state.session_key,
            &state.request_id,
        ),
        AuthDecision::Denied { reason } => state.audit.log_tool_auth(
            now_ms,
            false,
            reason,
            &state.agent_id,
            &state.session_key,
            &state.request_id,
        ),
    }

    (decision, state)
}

/// Record an executed tool call: audit it, feed the result back to the
/// model as a tool message, and charge its cost to the campaign.
pub fn record_tool_result(
    mut state: LoopState,
    call: &ToolCall,
    result: &ToolResult,
    now_ms: i64,
) -> LoopState {
    state.audit.log_tool_exec(
        now_ms,
        &format!(
            "tool '{}' executed (error={}, cost={} cent(s))",
            call.tool_name(),
            result.is_error,
            result.cost_cents
        ),
        &state.agent_id,
        &state.session_key,
        &state.request_id,
    );

    let message = Message::tool(&call.id, &result.for_llm);
    state.messages.push(message.clone());
    state.session.add_message(message);

    state.campaign = state.campaign.record_tool_call(result.cost_cents);
    state
}

/// Feed a denial back to the model as a tool message.
///
/// The denial itself was already audited by [`authorize_call`]; this
/// build always injects the reason so the model can react to it.
pub fn inject_denial_message(mut state: LoopState, call: &ToolCall, reason: &str) -> LoopState {
    let message = Message::tool(&call.id, format!("tool call denied: {reason}"));
    state.messages.push(message.clone());
    state.session.add_message(message);
    state
}

/// Record a failed `llm_call` callback.
pub fn fail_llm_call(mut state: LoopState, message: &str, now_ms: i64) -> IterationOutcome {
    state.audit.log_llm_call(
        now_ms,
        false,
        &format!("model call failed: {message}"),
        &state.agent_id,
        &state.session_key,
        &state.request_id,
    );
    IterationOutcome::IterationError {
        message: message.to_string(),
        state,
    }
}

/// Record a failed `execute_tool` callback.
pub fn fail_tool_call(
    mut state: LoopState,
    tool_name: &str,
    message: &str,
    now_ms: i64,
) -> IterationOutcome {
    state.audit.log_tool_exec(
        now_ms,
        &format!("tool '{tool_name}' failed: {message}"),
        &state.agent_id,
        &state.session_key,
        &state.request_id,
    );
    IterationOutcome::IterationError {
        message: message.to_string(),
        state,
    }
}

/// Close out the request with a final `message_processed` entry.
pub fn finalize(mut state: LoopState, summary: &str, now_ms: i64) -> LoopState {
    state.audit.log_message_processed(
        now_ms,
        summary,
        &state.agent_id,
        &state.session_key,
        &state.request_id,
    );
    state
}

fn minutes_between(start_ms: i64, now_ms: i64) -> u64 {
    (now_ms.saturating_sub(start_ms)).max(0) as u64 / 60_000
}
