//! Campaign guardrail accounting and the halt decision.
//!
//! [`CampaignState`] carries the monotone counters a campaign
//! accumulates (spend, tool calls, iterations, elapsed time);
//! [`should_halt`] compares them against the configured
//! [`Guardrails`]. A limit of zero means unbounded.

use serde::{Deserialize, Serialize};

use picoclaw_types::guardrails::{Guardrails, HaltReason};

/// Tools refused outright while `read_only` is set.
pub const READ_ONLY_DENIED_TOOLS: [&str; 3] = ["write_file", "exec_command", "delete_file"];

/// Denial reason used for read-only refusals.
pub const READ_ONLY_DENIAL: &str = "read-only mode";

/// Whether `read_only` mode refuses the named tool.
pub fn read_only_denies(tool_name: &str) -> bool {
    READ_ONLY_DENIED_TOOLS.contains(&tool_name)
}

/// Accumulated campaign accounting. All counters are monotone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignState {
    /// Minutes elapsed since the campaign started.
    pub elapsed_minutes: u64,

    /// Cents spent on tool execution.
    pub spent_cents: u64,

    /// Executed tool calls.
    pub tool_calls: u64,

    /// Completed loop iterations.
    pub iterations: u64,

    /// The kill switch was thrown.
    pub killed: bool,

    /// The campaign was marked complete.
    pub completed: bool,
}

impl CampaignState {
    /// Account one executed tool call costing `cost_cents`.
    #[must_use]
    pub fn record_tool_call(mut self, cost_cents: u64) -> Self {
        self.tool_calls += 1;
        self.spent_cents += cost_cents;
        self
    }

    /// Account one completed iteration and `elapsed` additional minutes.
    #[must_use]
    pub fn record_iteration(mut self, elapsed: u64) -> Self {
        self.iterations += 1;
        self.elapsed_minutes += elapsed;
        self
    }

    /// Throw the kill switch.
    #[must_use]
    pub fn activate_kill_switch(mut self) -> Self {
        self.killed = true;
        self
    }

    /// Mark the campaign complete.
    #[must_use]
    pub fn mark_completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Decide whether the campaign must stop before the next iteration.
///
/// Checks in order: kill switch, completion, budget, duration, tool-call
/// cap, iteration cap. Zero-valued limits never trip.
pub fn should_halt(state: &CampaignState, guardrails: &Guardrails) -> Option<HaltReason> {
    if state.killed || guardrails.kill_switch {
        return Some(HaltReason::KillSwitchActivated);
    }
    if state.completed {
        return Some(HaltReason::Completed);
    }
    if guardrails.budget_cents > 0 && state.spent_cents >= guardrails.budget_cents {
        return Some(HaltReason::BudgetExhausted);
    }
    if guardrails.max_duration_minutes > 0
        && state.elapsed_minutes >= guardrails.max_duration_minutes
    {
        return Some(HaltReason::DurationExceeded);
    }
    if guardrails.max_tool_calls > 0 && state.tool_calls >= guardrails.max_tool_calls {
        return Some(HaltReason::ToolCallLimitReached);
    }
    if guardrails.max_iterations > 0 && state.iterations >= guardrails.max_iterations {
        return Some(HaltReason::IterationLimitReached);
    }
    None
}

/// The user-visible sentinel phrase for a halt reason.
pub fn halt_sentinel(reason: HaltReason) -> &'static str {
    match reason {
        HaltReason::BudgetExhausted => "budget exhausted",
        HaltReason::DurationExceeded => "duration exceeded",
        HaltReason::ToolCallLimitReached => "tool call limit reached",
        HaltReason::IterationLimitReached => "iteration limit reached",
        HaltReason::KillSwitchActivated => "kill switch activated",
        HaltReason::Completed => "campaign completed",
    }
}
