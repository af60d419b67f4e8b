//! The runtime dispatcher.
//!
//! A [`Runtime`] owns the framed transport, the in-memory session map,
//! and the callback id counter. It reads requests from the shell one at
//! a time and drives the pure decision core to completion per request;
//! the only suspension points are the `llm_call` and `execute_tool`
//! callback round-trips. Processing is strictly serial: at most one
//! outstanding callback exists, and requests that arrive while one is
//! pending are refused (`ping` excepted).

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, warn};

use picoclaw_core::agent_loop::{
    authorize_call, error_sentinel, fail_llm_call, fail_tool_call, finalize, init_loop,
    inject_denial_message, record_tool_result, remaining_fuel, step_iteration, IterationOutcome,
    LoopState, FUEL_EXHAUSTED_SENTINEL,
};
use picoclaw_core::campaign::{halt_sentinel, should_halt};
use picoclaw_core::routing::resolve_route;
use picoclaw_types::auth::AuthDecision;
use picoclaw_types::error::{PicoClawError, Result};
use picoclaw_types::message::{LlmResponse, ToolResult};
use picoclaw_types::session::Session;

use crate::codec::{read_frame, write_frame};
use crate::types::{
    ExecuteToolParams, JsonRpcRequest, JsonRpcResponse, LlmCallParams, PingResult,
    ProcessMessageParams, ProcessMessageResult, INTERNAL_ERROR, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Serial JSON-RPC runtime over a framed reader/writer pair.
///
/// Sessions are created on first reference and live for the process
/// lifetime; each request works on a copy and writes the final session
/// back. The audit log is request-local and returned in the result.
pub struct Runtime<R, W> {
    reader: R,
    writer: W,
    sessions: HashMap<String, Session>,
    next_callback_id: u64,
}

impl<R, W> Runtime<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a runtime over the given transport halves.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            sessions: HashMap::new(),
            next_callback_id: 1,
        }
    }

    /// Serve requests until clean EOF on the reader.
    ///
    /// Bad JSON inside a well-formed frame produces an error response
    /// and the loop continues; framing violations and transport I/O
    /// failures are fatal.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let frame = match read_frame(&mut self.reader).await? {
                Some(frame) => frame,
                None => {
                    debug!("input closed, runtime exiting");
                    return Ok(());
                }
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&frame) {
                Ok(request) => request,
                Err(e) => {
                    self.respond(JsonRpcResponse::failure(
                        Value::Null,
                        PARSE_ERROR,
                        "parse error",
                        Some(json!(e.to_string())),
                    ))
                    .await?;
                    continue;
                }
            };

            self.dispatch(request).await?;
        }
    }

    async fn dispatch(&mut self, request: JsonRpcRequest) -> Result<()> {
        debug!(method = %request.method, "dispatching request");
        let id = request.id.clone();
        match request.method.as_str() {
            "ping" => {
                let result = serde_json::to_value(PingResult::ok())?;
                self.respond(JsonRpcResponse::success(id, result)).await
            }
            "process_message" => {
                let params: ProcessMessageParams = match serde_json::from_value(request.params) {
                    Ok(params) => params,
                    Err(e) => {
                        return self
                            .respond(JsonRpcResponse::failure(
                                id,
                                INTERNAL_ERROR,
                                "invalid process_message params",
                                Some(json!(e.to_string())),
                            ))
                            .await;
                    }
                };
                let result = self.process_message(params).await?;
                let result = serde_json::to_value(result)?;
                self.respond(JsonRpcResponse::success(id, result)).await
            }
            other => {
                self.respond(JsonRpcResponse::failure(
                    id,
                    METHOD_NOT_FOUND,
                    format!("method not found: {other}"),
                    None,
                ))
                .await
            }
        }
    }

    /// Drive one request through the decision core.
    async fn process_message(
        &mut self,
        params: ProcessMessageParams,
    ) -> Result<ProcessMessageResult> {
        let route = resolve_route(
            &params.bindings,
            &params.default_agent,
            params.dm_scope,
            &params.route_input,
        );
        let session = match self.sessions.get(&route.session_key) {
            Some(existing) => existing.clone(),
            None => {
                debug!(session_key = %route.session_key, "session created");
                Session::new(&route.session_key)
            }
        };

        let guardrails = params.guardrails.unwrap_or_default();
        let max_iterations = params.effective_max_iterations();
        let mut state = init_loop(
            &route,
            session,
            &params.content,
            &params.request_id,
            now_ms(),
        );

        let (content, halt_reason) = loop {
            if let Some(reason) = should_halt(&state.campaign, &guardrails) {
                let sentinel = halt_sentinel(reason);
                state = finalize(state, sentinel, now_ms());
                break (sentinel.to_string(), Some(reason));
            }

            let fuel = remaining_fuel(&state, max_iterations);
            if fuel == 0 {
                state = finalize(state, FUEL_EXHAUSTED_SENTINEL, now_ms());
                break (FUEL_EXHAUSTED_SENTINEL.to_string(), None);
            }

            let call_params = LlmCallParams {
                messages: state.messages.clone(),
                tools: params.tool_definitions.clone(),
                agent_id: state.agent_id.clone(),
                request_id: state.request_id.clone(),
            };
            let response = match self.call_llm(call_params).await {
                Ok(response) => response,
                Err(PicoClawError::Callback { message, .. }) => {
                    state = fail_llm_call(state, &message, now_ms()).into_state();
                    let content = error_sentinel(&message);
                    state = finalize(state, &content, now_ms());
                    break (content, None);
                }
                Err(e) => return Err(e),
            };

            match step_iteration(state, response, fuel, now_ms()) {
                IterationOutcome::FinalResponse { content, state: next } => {
                    let summary = format!("completed after {} iteration(s)", next.iteration);
                    state = finalize(next, &summary, now_ms());
                    break (content, None);
                }
                IterationOutcome::FuelExhausted { state: next } => {
                    state = finalize(next, FUEL_EXHAUSTED_SENTINEL, now_ms());
                    break (FUEL_EXHAUSTED_SENTINEL.to_string(), None);
                }
                IterationOutcome::IterationError { message, state: next } => {
                    let content = error_sentinel(&message);
                    state = finalize(next, &content, now_ms());
                    break (content, None);
                }
                IterationOutcome::NeedsToolCalls { calls, state: next } => {
                    state = next;
                    let mut callback_failure = None;

                    for call in &calls {
                        let (decision, next) = authorize_call(
                            state,
                            call,
                            &params.policy,
                            &params.grants,
                            guardrails.read_only,
                            now_ms(),
                        );
                        state = next;

                        match decision {
                            AuthDecision::Denied { reason } => {
                                state = inject_denial_message(state, call, &reason);
                            }
                            AuthDecision::Authorized { grant } => {
                                let exec_params = ExecuteToolParams {
                                    tool_name: call.tool_name().to_string(),
                                    arguments: call.arguments().to_string(),
                                    agent_id: state.agent_id.clone(),
                                    grant_proof: serde_json::to_string(&grant)?,
                                    request_id: state.request_id.clone(),
                                };
                                match self.call_tool(exec_params).await {
                                    Ok(result) => {
                                        state =
                                            record_tool_result(state, call, &result, now_ms());
                                    }
                                    Err(PicoClawError::Callback { message, .. }) => {
                                        state = fail_tool_call(
                                            state,
                                            call.tool_name(),
                                            &message,
                                            now_ms(),
                                        )
                                        .into_state();
                                        callback_failure = Some(message);
                                        break;
                                    }
                                    Err(e) => return Err(e),
                                }
                            }
                        }
                    }

                    if let Some(message) = callback_failure {
                        let content = error_sentinel(&message);
                        state = finalize(state, &content, now_ms());
                        break (content, None);
                    }
                }
            }
        };

        let LoopState { mut session, audit, .. } = state;

        let keep = params.summary_keep_last as usize;
        if keep > 0 && session.needs_summarization(keep) {
            let overflow = session.messages.len() - keep;
            session.summarize(&format!("{overflow} earlier message(s) compacted"), keep);
        }
        self.sessions.insert(route.session_key.clone(), session);

        Ok(ProcessMessageResult {
            content,
            agent_id: route.agent_id,
            session_key: route.session_key,
            audit_log: audit.into_entries(),
            halt_reason,
        })
    }

    async fn call_llm(&mut self, params: LlmCallParams) -> Result<LlmResponse> {
        let value = self
            .issue_callback("llm_call", serde_json::to_value(&params)?)
            .await?;
        serde_json::from_value(value).map_err(|e| PicoClawError::Callback {
            method: "llm_call".into(),
            message: format!("invalid result: {e}"),
        })
    }

    async fn call_tool(&mut self, params: ExecuteToolParams) -> Result<ToolResult> {
        let value = self
            .issue_callback("execute_tool", serde_json::to_value(&params)?)
            .await?;
        serde_json::from_value(value).map_err(|e| PicoClawError::Callback {
            method: "execute_tool".into(),
            message: format!("invalid result: {e}"),
        })
    }

    /// Send a callback request and block until its correlated response
    /// arrives.
    ///
    /// While waiting, `ping` requests are answered inline, any other
    /// inbound request is refused with an internal error, and frames
    /// that are neither are logged and skipped. EOF with the callback
    /// pending is fatal.
    async fn issue_callback(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_callback_id;
        self.next_callback_id += 1;

        let request = JsonRpcRequest::new(json!(id), method, params);
        write_frame(&mut self.writer, &serde_json::to_vec(&request)?).await?;
        debug!(method, id, "callback issued");

        loop {
            let frame = match read_frame(&mut self.reader).await? {
                Some(frame) => frame,
                None => {
                    return Err(PicoClawError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "input closed while a callback response was pending",
                    )));
                }
            };

            let value: Value = match serde_json::from_slice(&frame) {
                Ok(value) => value,
                Err(e) => {
                    self.respond(JsonRpcResponse::failure(
                        Value::Null,
                        PARSE_ERROR,
                        "parse error",
                        Some(json!(e.to_string())),
                    ))
                    .await?;
                    continue;
                }
            };

            if value.get("method").is_some() {
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Ok(inbound) if inbound.method == "ping" => {
                        let result = serde_json::to_value(PingResult::ok())?;
                        self.respond(JsonRpcResponse::success(inbound.id, result))
                            .await?;
                    }
                    Ok(inbound) => {
                        warn!(
                            method = %inbound.method,
                            "refusing request while a callback is in flight"
                        );
                        self.respond(JsonRpcResponse::failure(
                            inbound.id,
                            INTERNAL_ERROR,
                            "callback in flight",
                            None,
                        ))
                        .await?;
                    }
                    Err(e) => {
                        self.respond(JsonRpcResponse::failure(
                            Value::Null,
                            INVALID_REQUEST,
                            "invalid request",
                            Some(json!(e.to_string())),
                        ))
                        .await?;
                    }
                }
                continue;
            }

            let response: JsonRpcResponse = match serde_json::from_value(value) {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "skipping malformed frame while awaiting callback");
                    continue;
                }
            };
            if response.id != json!(id) {
                warn!(got = ?response.id, expected = id, "response with unexpected id, skipping");
                continue;
            }
            if let Some(error) = response.error {
                return Err(PicoClawError::Callback {
                    method: method.to_string(),
                    message: format!("{} (code {})", error.message, error.code),
                });
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    async fn respond(&mut self, response: JsonRpcResponse) -> Result<()> {
        write_frame(&mut self.writer, &serde_json::to_vec(&response)?).await
    }
}
