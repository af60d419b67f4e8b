//! # picoclaw-core
//!
//! The pure decision core of PicoClaw. Every function here is total and
//! deterministic: values in, values out, no I/O. The runtime crate
//! (`picoclaw-rpc`) owns the session map and the stdio transport and
//! drives these functions per request.
//!
//! - **[`routing`]** -- seven-level binding cascade and session keys
//! - **[`auth`]** -- tool authorization against policy + grants
//! - **[`audit`]** -- append-only hash-chained journal
//! - **[`campaign`]** -- guardrail accounting and halt decision
//! - **[`agent_loop`]** -- fuel-bounded loop state machine

pub mod agent_loop;
pub mod audit;
pub mod auth;
pub mod campaign;
pub mod routing;

pub use agent_loop::{
    authorize_call, error_sentinel, fail_llm_call, fail_tool_call, finalize,
    init_loop, inject_denial_message, record_tool_result, remaining_fuel, step_iteration,
    IterationOutcome, LoopState, FUEL_EXHAUSTED_SENTINEL,
};
pub use audit::AuditLog;
pub use auth::{authorize, authorize_many, lookup_level};
pub use campaign::{
    halt_sentinel, read_only_denies, should_halt, CampaignState, READ_ONLY_DENIAL,
    READ_ONLY_DENIED_TOOLS,
};
pub use routing::{main_session_key, resolve_route, session_key};
