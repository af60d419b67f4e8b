//! Campaign guardrail configuration and halt reasons.

use serde::{Deserialize, Serialize};

/// Static limits for a campaign. A limit of zero means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardrails {
    /// Maximum campaign duration in minutes.
    #[serde(default)]
    pub max_duration_minutes: u64,

    /// Spending cap in cents.
    #[serde(default)]
    pub budget_cents: u64,

    /// Maximum executed tool calls.
    #[serde(default)]
    pub max_tool_calls: u64,

    /// Maximum loop iterations.
    #[serde(default)]
    pub max_iterations: u64,

    /// Deny mutating tools (`write_file`, `exec_command`, `delete_file`).
    #[serde(default)]
    pub read_only: bool,

    /// Statically halt the campaign.
    #[serde(default)]
    pub kill_switch: bool,
}

/// Why a campaign stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// Spending reached the budget cap.
    BudgetExhausted,
    /// Wall-clock duration reached the cap.
    DurationExceeded,
    /// Executed tool calls reached the cap.
    ToolCallLimitReached,
    /// Loop iterations reached the cap.
    IterationLimitReached,
    /// The kill switch was activated.
    KillSwitchActivated,
    /// The campaign was marked complete.
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_guardrails_are_unbounded() {
        let g = Guardrails::default();
        assert_eq!(g.budget_cents, 0);
        assert_eq!(g.max_iterations, 0);
        assert!(!g.read_only);
        assert!(!g.kill_switch);
    }

    #[test]
    fn guardrails_partial_json() {
        let g: Guardrails = serde_json::from_str(r#"{"budget_cents":100}"#).unwrap();
        assert_eq!(g.budget_cents, 100);
        assert_eq!(g.max_tool_calls, 0);
    }

    #[test]
    fn halt_reason_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&HaltReason::BudgetExhausted).unwrap(),
            "\"budget_exhausted\""
        );
        let back: HaltReason = serde_json::from_str("\"kill_switch_activated\"").unwrap();
        assert_eq!(back, HaltReason::KillSwitchActivated);
    }
}
