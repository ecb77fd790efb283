//! Exploded Graph Walker
//!
//! Worklist fixpoint over (program point, program state) nodes of one
//! method body:
//!
//! 1. seed the CFG entry with the initial state (parameters bound to fresh values)
//! 2. pop a node; instructions go through pre-process checks, the
//!    instruction effect and post-process checks, terminators split or
//!    follow their edges
//! 3. enqueue successors not seen before, until the worklist is empty or
//!    a budget is exhausted
//! 4. notify every check that exploration ended and collect its diagnostics
//!
//! Termination: block entries of loop heads are counted per path and
//! bounded, so every path is finite; equal nodes are explored once.

use crate::config::SymexConfig;
use crate::features::checks::{
    Branch, BranchOutcome, Check, CheckContext, CheckError, CheckRegistry, CheckResult, Diagnostic, Inbox,
};
use crate::features::exploded_graph::domain::{
    AbortReason, CheckFault, ExplodedGraphNode, ExplorationOutcome, ExplorationStats, ExplorationStatus,
};
use crate::features::exploded_graph::infrastructure::InstructionEffects;
use crate::features::program_state::{Constraint, ProgramPoint, ProgramState, SymbolicValue, SymbolicValueFactory};
use crate::shared::models::{
    BasicBlock, BlockId, CfgEdgeKind, Instruction, MethodBody, Nullability, SymbolId, SymbolResolver,
    Terminator,
};
use rustc_hash::FxHashSet;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// A check plus what the walk tracks about it
struct RegisteredCheck {
    check: Box<dyn Check>,
    diagnostics: Vec<Diagnostic>,
    fault: Option<CheckError>,
}

impl RegisteredCheck {
    fn disable(&mut self, error: CheckError, method: &str) {
        warn!(
            method = %method,
            check = self.check.name(),
            error = %error,
            dropped_diagnostics = self.diagnostics.len(),
            "Check faulted, disabled for the rest of the walk"
        );
        self.diagnostics.clear();
        self.fault = Some(error);
    }
}

/// Walk of one method body
pub struct ExplodedGraphWalker<'m> {
    method: &'m MethodBody,
    config: SymexConfig,
    checks: Vec<RegisteredCheck>,
    factory: SymbolicValueFactory,
    inbox: Inbox,
    worklist: VecDeque<ExplodedGraphNode>,
    visited: FxHashSet<ExplodedGraphNode>,
    loop_heads: FxHashSet<BlockId>,
    initial_state: ProgramState,
    stats: ExplorationStats,
}

impl<'m> ExplodedGraphWalker<'m> {
    pub fn new(method: &'m MethodBody, config: SymexConfig) -> Self {
        Self {
            method,
            config,
            checks: Vec::new(),
            factory: SymbolicValueFactory::new(),
            inbox: Inbox::new(),
            worklist: VecDeque::new(),
            visited: FxHashSet::default(),
            loop_heads: method.cfg.loop_heads().into_iter().collect(),
            initial_state: ProgramState::new(),
            stats: ExplorationStats::default(),
        }
    }

    /// Register a check; hooks run in registration order
    pub fn register(&mut self, check: Box<dyn Check>) -> &mut Self {
        self.checks.push(RegisteredCheck {
            check,
            diagnostics: Vec::new(),
            fault: None,
        });
        self
    }

    /// Builder: Register a check
    pub fn with_check(mut self, check: Box<dyn Check>) -> Self {
        self.register(check);
        self
    }

    /// Builder: Register fresh instances of every check in `registry`
    pub fn with_registry(mut self, registry: &CheckRegistry) -> Self {
        for check in registry.instantiate() {
            self.register(check);
        }
        self
    }

    /// Explore the method and collect the checks' findings
    pub fn walk(mut self) -> ExplorationOutcome {
        debug!(
            method = %self.method.name,
            blocks = self.method.cfg.len(),
            checks = self.checks.len(),
            loop_heads = self.loop_heads.len(),
            "Starting exploded graph walk"
        );

        self.initial_state = self.seed();
        let status = match self.explore() {
            Ok(()) => ExplorationStatus::Completed,
            Err(reason) => {
                warn!(
                    method = %self.method.name,
                    reason = %reason,
                    explored_states = self.stats.explored_states,
                    "Walk aborted, method reported as incomplete"
                );
                ExplorationStatus::Incomplete(reason)
            }
        };
        self.finish(status)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Exploration
    // ═══════════════════════════════════════════════════════════════════════

    fn seed(&mut self) -> ProgramState {
        let symbols = &self.method.symbols;
        let parameters: Vec<(SymbolId, Nullability)> = self
            .method
            .parameters
            .iter()
            .map(|p| (*p, symbols.resolve(*p).map(|s| s.nullability).unwrap_or_default()))
            .collect();
        ProgramState::initial(parameters, &mut self.factory)
    }

    fn explore(&mut self) -> Result<(), AbortReason> {
        let entry = ProgramPoint::entry_of(self.method.cfg.entry);
        self.enqueue(entry, self.initial_state.clone())?;

        while let Some(node) = self.worklist.pop_front() {
            self.stats.steps += 1;
            self.step(node)?;
        }
        Ok(())
    }

    fn step(&mut self, node: ExplodedGraphNode) -> Result<(), AbortReason> {
        let ExplodedGraphNode { point, state } = node;
        let method = self.method;
        let Some(block) = method.cfg.block(point.block) else {
            self.modeling_gap(point, &format!("missing block {}", point.block));
            return Ok(());
        };

        match block.instructions.get(point.offset) {
            Some(instruction) => self.visit_instruction(block, point, instruction, state),
            None => self.visit_terminator(block, point, state),
        }
    }

    fn visit_instruction(
        &mut self,
        block: &'m BasicBlock,
        point: ProgramPoint,
        instruction: &'m Instruction,
        state: ProgramState,
    ) -> Result<(), AbortReason> {
        trace!(
            point = %point,
            instruction = instruction.kind.mnemonic(),
            stack_depth = state.stack_depth(),
            "Visiting instruction"
        );

        if instruction.kind.may_throw() && block.has_exception_handlers() {
            let thrown = state.clear_stack();
            for handler in block.exception_successors() {
                self.enqueue(ProgramPoint::entry_of(handler), thrown.clone())?;
            }
        }

        let Some(state) = self.dispatch(point, Some(instruction), state, |check, ctx, state| {
            check.pre_process_instruction(ctx, state)
        }) else {
            self.stats.pruned_paths += 1;
            return Ok(());
        };

        let applied = InstructionEffects::new(&self.method.symbols, &mut self.factory).apply(instruction, state);
        let state = match applied {
            Ok(Some(state)) => state,
            Ok(None) => {
                self.stats.pruned_paths += 1;
                return Ok(());
            }
            Err(gap) => {
                self.modeling_gap(point, &gap);
                return Ok(());
            }
        };

        let Some(state) = self.dispatch(point, Some(instruction), state, |check, ctx, state| {
            check.post_process_instruction(ctx, state)
        }) else {
            self.stats.pruned_paths += 1;
            return Ok(());
        };

        self.enqueue(point.next(), state)
    }

    fn visit_terminator(
        &mut self,
        block: &'m BasicBlock,
        point: ProgramPoint,
        state: ProgramState,
    ) -> Result<(), AbortReason> {
        match block.terminator {
            Terminator::Jump => {
                for edge in block.successors.iter().filter(|e| e.kind.is_unconditional()) {
                    self.enqueue(ProgramPoint::entry_of(edge.target), state.clone())?;
                }
                Ok(())
            }
            Terminator::Conditional => {
                let Some((state, condition)) = state.pop_value() else {
                    self.modeling_gap(point, &"conditional branch without a condition value");
                    return Ok(());
                };
                self.split(
                    block,
                    point,
                    &state,
                    &condition,
                    [
                        (BranchOutcome::True, Constraint::TRUE, CfgEdgeKind::TrueBranch),
                        (BranchOutcome::False, Constraint::FALSE, CfgEdgeKind::FalseBranch),
                    ],
                )
            }
            Terminator::NullCheck => {
                // The tested operand stays on the stack for both successors.
                let Some(operand) = state.peek_value(0) else {
                    self.modeling_gap(point, &"null check without an operand");
                    return Ok(());
                };
                self.split(
                    block,
                    point,
                    &state,
                    &operand,
                    [
                        (BranchOutcome::Null, Constraint::NULL, CfgEdgeKind::NullBranch),
                        (BranchOutcome::NotNull, Constraint::NOT_NULL, CfgEdgeKind::NotNullBranch),
                    ],
                )
            }
            Terminator::Throw => {
                let thrown = state.clear_stack();
                let mut handled = false;
                for handler in block.exception_successors() {
                    handled = true;
                    self.enqueue(ProgramPoint::entry_of(handler), thrown.clone())?;
                }
                if !handled {
                    self.stats.completed_paths += 1;
                }
                Ok(())
            }
            Terminator::Return { .. } | Terminator::Exit => {
                self.stats.completed_paths += 1;
                Ok(())
            }
        }
    }

    /// Fork `state` on `condition`: each side gets its constraint, goes
    /// through the checks' branch hook and flows to the matching edges.
    /// A side whose constraint contradicts the state is dropped.
    fn split(
        &mut self,
        block: &'m BasicBlock,
        point: ProgramPoint,
        state: &ProgramState,
        condition: &SymbolicValue,
        sides: [(BranchOutcome, Constraint, CfgEdgeKind); 2],
    ) -> Result<(), AbortReason> {
        for (outcome, constraint, kind) in sides {
            let Some(constrained) = state.set_constraint(condition, constraint) else {
                trace!(point = %point, outcome = outcome.as_str(), "Infeasible branch pruned");
                self.stats.pruned_paths += 1;
                continue;
            };

            let branch = Branch {
                condition: condition.clone(),
                outcome,
            };
            let Some(constrained) = self.dispatch(point, None, constrained, |check, ctx, state| {
                check.process_branch(ctx, state, &branch)
            }) else {
                self.stats.pruned_paths += 1;
                continue;
            };

            for target in block.successors_of_kind(kind) {
                self.enqueue(ProgramPoint::entry_of(target), constrained.clone())?;
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, point: ProgramPoint, state: ProgramState) -> Result<(), AbortReason> {
        let mut state = state;
        if point.is_block_entry() {
            if self.config.collect_garbage {
                state = state.collect_garbage();
            }
            if self.loop_heads.contains(&point.block) {
                if state.visit_count(point.block) >= self.config.max_block_visits_per_path {
                    trace!(point = %point, "Loop unrolling bound reached, path dropped");
                    self.stats.loop_cutoffs += 1;
                    return Ok(());
                }
                state = state.record_visit(point.block);
            }
        }

        if state.stack_depth() > self.config.max_stack_depth {
            return Err(AbortReason::StackDepthExceeded {
                limit: self.config.max_stack_depth,
                depth: state.stack_depth(),
            });
        }

        let node = ExplodedGraphNode::new(point, state);
        if self.visited.contains(&node) {
            return Ok(());
        }
        if self.visited.len() >= self.config.max_explored_states {
            return Err(AbortReason::StateBudgetExceeded {
                limit: self.config.max_explored_states,
            });
        }

        self.visited.insert(node.clone());
        self.stats.explored_states += 1;
        self.worklist.push_back(node);
        Ok(())
    }

    fn modeling_gap(&mut self, point: ProgramPoint, reason: &dyn std::fmt::Display) {
        self.stats.modeling_gaps += 1;
        debug!(
            method = %self.method.name,
            point = %point,
            reason = %reason,
            "Modeling gap, path dropped"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Check dispatch
    // ═══════════════════════════════════════════════════════════════════════

    /// Thread `state` through every healthy check in registration order.
    /// `None` when a check prunes the path. A faulting check is disabled and
    /// the state it received is passed on unchanged.
    fn dispatch<F>(
        &mut self,
        point: ProgramPoint,
        instruction: Option<&'m Instruction>,
        state: ProgramState,
        mut hook: F,
    ) -> Option<ProgramState>
    where
        F: FnMut(&mut dyn Check, &mut CheckContext<'_>, ProgramState) -> CheckResult,
    {
        let isolate = self.config.isolate_check_panics;
        let mut current = state;

        for registered in self.checks.iter_mut() {
            if registered.fault.is_some() {
                continue;
            }
            let input = current.clone();
            let result = {
                let mut ctx = CheckContext::new(
                    registered.check.name(),
                    self.method,
                    &self.initial_state,
                    &mut self.inbox,
                    &mut registered.diagnostics,
                )
                .at(point, instruction);
                let check = registered.check.as_mut();
                guarded(isolate, || hook(check, &mut ctx, input))
            };

            match result {
                Ok(Some(next)) => current = next,
                Ok(None) => return None,
                Err(error) => registered.disable(error, &self.method.name),
            }
        }
        Some(current)
    }

    fn finish(mut self, status: ExplorationStatus) -> ExplorationOutcome {
        let isolate = self.config.isolate_check_panics;
        for registered in self.checks.iter_mut() {
            if registered.fault.is_some() {
                continue;
            }
            let result = {
                let mut ctx = CheckContext::new(
                    registered.check.name(),
                    self.method,
                    &self.initial_state,
                    &mut self.inbox,
                    &mut registered.diagnostics,
                );
                let check = registered.check.as_mut();
                guarded(isolate, || check.exploration_ended(&mut ctx))
            };
            if let Err(error) = result {
                registered.disable(error, &self.method.name);
            }
        }

        let mut diagnostics = Vec::new();
        let mut faulted_checks = Vec::new();
        for registered in self.checks {
            match registered.fault {
                Some(error) => faulted_checks.push(CheckFault {
                    check: registered.check.name().to_string(),
                    error: error.to_string(),
                }),
                None => diagnostics.extend(registered.diagnostics),
            }
        }
        diagnostics.sort_by(|a, b| {
            a.sort_key()
                .cmp(&b.sort_key())
                .then_with(|| a.check.cmp(&b.check))
                .then_with(|| a.message_template.cmp(&b.message_template))
        });
        diagnostics.dedup();

        if status != ExplorationStatus::Completed && !diagnostics.is_empty() {
            debug!(
                method = %self.method.name,
                discarded = diagnostics.len(),
                "Discarding diagnostics of incomplete walk"
            );
            diagnostics.clear();
        }

        debug!(
            method = %self.method.name,
            complete = status == ExplorationStatus::Completed,
            steps = self.stats.steps,
            explored_states = self.stats.explored_states,
            diagnostics = diagnostics.len(),
            "Walk finished"
        );

        ExplorationOutcome {
            status,
            diagnostics,
            stats: self.stats,
            faulted_checks,
        }
    }
}

/// Run a check hook, turning a panic into a [`CheckError`] when `isolate`
fn guarded<T>(isolate: bool, hook: impl FnOnce() -> Result<T, CheckError>) -> Result<T, CheckError> {
    if !isolate {
        return hook();
    }
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result,
        Err(payload) => Err(CheckError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
