//! Check Ports - Interface Layer
//!
//! A check is a stateful visitor registered with exactly one walk. The
//! walker calls its hooks in registration order and threads the program
//! state through them: the state a check returns is the next check's input.
//! Returning `Ok(None)` prunes the path, returning `Err` faults the check.
//!
//! ## Usage
//! ```rust,ignore
//! struct Noop;
//!
//! impl Check for Noop {
//!     fn name(&self) -> &'static str {
//!         "Noop"
//!     }
//! }
//!
//! walker.register(Box::new(Noop));
//! ```

use super::domain::{CheckMessage, Diagnostic, Inbox};
use crate::features::program_state::{ProgramPoint, ProgramState, SymbolicValue};
use crate::shared::models::{Instruction, InstructionKind, MethodBody, Span, SymbolId, SymbolResolver};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════

/// Fault raised by a check; the check is disabled for the rest of the walk
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The check hit a state it cannot handle
    #[error("{0}")]
    Failed(String),

    /// The check panicked (caught by the walker)
    #[error("panicked: {0}")]
    Panicked(String),
}

impl CheckError {
    pub fn failed(message: impl Into<String>) -> Self {
        CheckError::Failed(message.into())
    }
}

/// Outcome of a state-transforming hook
pub type CheckResult = Result<Option<ProgramState>, CheckError>;

// ═══════════════════════════════════════════════════════════════════════════
// Branches
// ═══════════════════════════════════════════════════════════════════════════

/// Which way a split terminator went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchOutcome {
    True,
    False,
    Null,
    NotNull,
}

impl BranchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchOutcome::True => "true",
            BranchOutcome::False => "false",
            BranchOutcome::Null => "null",
            BranchOutcome::NotNull => "not null",
        }
    }
}

/// One side of a split terminator
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Tested value: the condition of a `Conditional`, the operand of a `NullCheck`
    pub condition: SymbolicValue,
    pub outcome: BranchOutcome,
}

// ═══════════════════════════════════════════════════════════════════════════
// Context
// ═══════════════════════════════════════════════════════════════════════════

/// What a check can see and do during one callback
pub struct CheckContext<'a> {
    check: &'static str,
    method: &'a MethodBody,
    initial_state: &'a ProgramState,
    point: Option<ProgramPoint>,
    instruction: Option<&'a Instruction>,
    inbox: &'a mut Inbox,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        check: &'static str,
        method: &'a MethodBody,
        initial_state: &'a ProgramState,
        inbox: &'a mut Inbox,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            check,
            method,
            initial_state,
            point: None,
            instruction: None,
            inbox,
            diagnostics,
        }
    }

    /// Builder: Set the current program point
    pub fn at(mut self, point: ProgramPoint, instruction: Option<&'a Instruction>) -> Self {
        self.point = Some(point);
        self.instruction = instruction;
        self
    }

    pub fn method(&self) -> &'a MethodBody {
        self.method
    }

    /// State the walk started from (parameter bindings)
    pub fn initial_state(&self) -> &'a ProgramState {
        self.initial_state
    }

    /// Current program point; `None` during `exploration_ended`
    pub fn point(&self) -> Option<ProgramPoint> {
        self.point
    }

    /// Instruction at the current point; `None` at terminators
    pub fn instruction(&self) -> Option<&'a Instruction> {
        self.instruction
    }

    /// Source span of the current point: the instruction span, else the block span
    pub fn span(&self) -> Option<Span> {
        if let Some(span) = self.instruction.and_then(|i| i.span) {
            return Some(span);
        }
        let point = self.point?;
        self.method.cfg.block(point.block).and_then(|b| b.span)
    }

    /// Human-readable name of `value` in `state`: the symbol it was last
    /// loaded from in the current block, any symbol bound to it, `this`,
    /// or a generic placeholder
    pub fn describe(&self, state: &ProgramState, value: &SymbolicValue) -> String {
        let symbol = self
            .loaded_from(state, value)
            .or_else(|| state.symbols_of(value).next());
        if let Some(symbol) = symbol {
            return self.method.symbols.display_name(symbol);
        }
        if *value == SymbolicValue::this() {
            return "this".to_string();
        }
        "expression".to_string()
    }

    /// Nearest symbol loaded before the current point, in the current block,
    /// that is still bound to `value`. Aliases share a value, so this names
    /// the one the source actually used.
    fn loaded_from(&self, state: &ProgramState, value: &SymbolicValue) -> Option<SymbolId> {
        let point = self.point?;
        let block = self.method.cfg.block(point.block)?;
        let end = point.offset.min(block.instructions.len());
        block.instructions[..end]
            .iter()
            .rev()
            .find_map(|instruction| match &instruction.kind {
                InstructionKind::LoadSymbol(symbol) if state.value_of(*symbol) == Some(value) => Some(*symbol),
                _ => None,
            })
    }

    pub fn post(&mut self, message: CheckMessage) {
        self.inbox.post(message);
    }

    pub fn inbox(&self) -> &Inbox {
        self.inbox
    }

    /// Record a diagnostic at the current point
    pub fn report(&mut self, rule_id: &str, message_template: &str, arguments: Vec<String>) {
        let Some(point) = self.point else {
            return;
        };
        let span = self.span();
        self.report_at(rule_id, point, span, message_template, arguments);
    }

    /// Record a diagnostic at an explicit point (used at walk end)
    pub fn report_at(
        &mut self,
        rule_id: &str,
        point: ProgramPoint,
        span: Option<Span>,
        message_template: &str,
        arguments: Vec<String>,
    ) {
        self.diagnostics.push(Diagnostic::new(
            rule_id,
            self.check,
            point,
            span,
            message_template,
            arguments,
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Check Port
// ═══════════════════════════════════════════════════════════════════════════

/// Pluggable visitor of one walk
///
/// # Implementors
/// - `NullPointerDereferenceCheck`
/// - `ObjectDisposedCheck`
/// - `UncheckedArgumentCheck`
/// - `ConstantConditionCheck`
pub trait Check: Send {
    /// Check name for diagnostics and logging
    fn name(&self) -> &'static str;

    /// Before the instruction at `ctx.point()` takes effect
    fn pre_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        let _ = ctx;
        Ok(Some(state))
    }

    /// After the instruction at `ctx.point()` took effect
    fn post_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        let _ = ctx;
        Ok(Some(state))
    }

    /// On each feasible side of a split terminator, after the branch
    /// constraint was applied
    fn process_branch(
        &mut self,
        ctx: &mut CheckContext<'_>,
        state: ProgramState,
        branch: &Branch,
    ) -> CheckResult {
        let _ = (ctx, branch);
        Ok(Some(state))
    }

    /// Walk finished (completed or aborted): flush accumulated findings
    fn exploration_ended(&mut self, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        let _ = ctx;
        Ok(())
    }
}
