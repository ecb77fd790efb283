//! Result of one method walk

use crate::features::checks::Diagnostic;
use serde::{Deserialize, Serialize};

/// Why a walk stopped before reaching its fixpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// More distinct (point, state) nodes than `max_explored_states`
    StateBudgetExceeded { limit: usize },
    /// A state's operand stack grew beyond `max_stack_depth`
    StackDepthExceeded { limit: usize, depth: usize },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::StateBudgetExceeded { limit } => {
                write!(f, "explored state budget of {} exceeded", limit)
            }
            AbortReason::StackDepthExceeded { limit, depth } => {
                write!(f, "operand stack depth {} exceeds limit {}", depth, limit)
            }
        }
    }
}

/// Whether the walk reached its fixpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplorationStatus {
    Completed,
    /// Aborted on a budget; no diagnostics are reported
    Incomplete(AbortReason),
}

/// Counters collected during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationStats {
    /// Nodes taken off the worklist
    pub steps: usize,
    /// Distinct nodes ever enqueued
    pub explored_states: usize,
    /// Paths dropped because a constraint contradicted or a check pruned them
    pub pruned_paths: usize,
    /// Paths dropped because the engine could not model an instruction
    pub modeling_gaps: usize,
    /// Paths dropped by the per-path loop unrolling bound
    pub loop_cutoffs: usize,
    /// Paths that reached a method exit
    pub completed_paths: usize,
}

/// Check that faulted during a walk; its diagnostics were dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFault {
    pub check: String,
    pub error: String,
}

/// Everything a walk produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationOutcome {
    pub status: ExplorationStatus,
    /// Sorted by program point, then rule; always empty when incomplete
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ExplorationStats,
    pub faulted_checks: Vec<CheckFault>,
}

impl ExplorationOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == ExplorationStatus::Completed
    }

    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self.status {
            ExplorationStatus::Completed => None,
            ExplorationStatus::Incomplete(reason) => Some(reason),
        }
    }

    /// Diagnostics of one rule
    pub fn diagnostics_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.rule_id == rule_id)
    }
}
