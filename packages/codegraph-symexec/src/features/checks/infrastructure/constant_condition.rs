//! Conditions that always evaluate the same way (S2583 / S2589)
//!
//! Every feasible side of every `Conditional` terminator is recorded. At walk
//! end a condition that only ever went one way is reported: S2583 when the
//! other side's code was never executed at all, S2589 otherwise.
//!
//! Conditions inside loops are skipped: loop unrolling is bounded, so the
//! walk may not have seen the iterations in which they change.
//! Literal conditions (`while (true)`) are intentional and skipped as well.

use crate::features::checks::ports::{Branch, BranchOutcome, Check, CheckContext, CheckError, CheckResult};
use crate::features::program_state::{ProgramPoint, ProgramState};
use crate::shared::models::{BlockId, CfgEdgeKind, MethodBody, Span, Terminator};
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

pub const CONDITION_ALWAYS_SAME_DEAD_CODE_RULE: &str = "S2583";
pub const CONDITION_ALWAYS_SAME_RULE: &str = "S2589";

const DEAD_CODE_MESSAGE: &str =
    "Change this condition so that it does not always evaluate to '{0}'; some subsequent code is never executed.";
const GRATUITOUS_MESSAGE: &str = "Change this condition so that it does not always evaluate to '{0}'.";

#[derive(Debug, Default)]
struct ConditionRecord {
    outcomes: BTreeSet<BranchOutcome>,
    span: Option<Span>,
    literal: bool,
}

#[derive(Debug, Default)]
pub struct ConstantConditionCheck {
    conditions: BTreeMap<ProgramPoint, ConditionRecord>,
    executed_blocks: FxHashSet<BlockId>,
}

impl ConstantConditionCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// The never-taken side has code and none of it ran
    fn skipped_side_is_dead(&self, method: &MethodBody, block: BlockId, skipped: CfgEdgeKind) -> bool {
        let Some(block) = method.cfg.block(block) else {
            return false;
        };
        let mut targets = block.successors_of_kind(skipped).peekable();
        if targets.peek().is_none() {
            return false;
        }
        targets.all(|target| {
            method
                .cfg
                .block(target)
                .map_or(false, |b| !b.instructions.is_empty() && !self.executed_blocks.contains(&target))
        })
    }
}

impl Check for ConstantConditionCheck {
    fn name(&self) -> &'static str {
        "ConstantCondition"
    }

    fn pre_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        if let Some(point) = ctx.point() {
            self.executed_blocks.insert(point.block);
        }
        Ok(Some(state))
    }

    fn process_branch(
        &mut self,
        ctx: &mut CheckContext<'_>,
        state: ProgramState,
        branch: &Branch,
    ) -> CheckResult {
        if !matches!(branch.outcome, BranchOutcome::True | BranchOutcome::False) {
            return Ok(Some(state));
        }
        if let Some(point) = ctx.point() {
            let span = ctx.span();
            let record = self.conditions.entry(point).or_default();
            record.outcomes.insert(branch.outcome);
            record.span = span;
            record.literal |= branch.condition.is_singleton();
        }
        Ok(Some(state))
    }

    fn exploration_ended(&mut self, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        let method = ctx.method();
        let in_loops: FxHashSet<BlockId> = method.cfg.cyclic_blocks().into_iter().collect();

        let conditions = std::mem::take(&mut self.conditions);
        for (point, record) in conditions {
            if record.literal || in_loops.contains(&point.block) || record.outcomes.len() != 1 {
                continue;
            }
            let is_conditional = method
                .cfg
                .block(point.block)
                .map_or(false, |b| b.terminator == Terminator::Conditional);
            if !is_conditional {
                continue;
            }

            let Some(outcome) = record.outcomes.iter().next().copied() else {
                continue;
            };
            let skipped = if outcome == BranchOutcome::True {
                CfgEdgeKind::FalseBranch
            } else {
                CfgEdgeKind::TrueBranch
            };

            let (rule, template) = if self.skipped_side_is_dead(method, point.block, skipped) {
                (CONDITION_ALWAYS_SAME_DEAD_CODE_RULE, DEAD_CODE_MESSAGE)
            } else {
                (CONDITION_ALWAYS_SAME_RULE, GRATUITOUS_MESSAGE)
            };
            ctx.report_at(rule, point, record.span, template, vec![outcome.as_str().to_string()]);
        }
        Ok(())
    }
}
