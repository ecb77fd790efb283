//! Null pointer dereference (S2259)
//!
//! A member access or instance call on a value known to be `Null` is
//! reported and the path ends there. On a value with unknown nullness the
//! access itself proves the value was not null on the continuing path, so
//! the receiver becomes `NotNull`, and the event is posted for
//! [`super::UncheckedArgumentCheck`].

use crate::features::checks::domain::CheckMessage;
use crate::features::checks::ports::{Check, CheckContext, CheckResult};
use crate::features::program_state::{Constraint, ConstraintFamily, ProgramState, SymbolicValue};
use crate::shared::models::{Instruction, InstructionKind};

pub const NULL_POINTER_DEREFERENCE_RULE: &str = "S2259";

const MESSAGE: &str = "'{0}' is null on at least one execution path.";

/// Receiver dereferenced by `instruction`, if any
pub(crate) fn dereferenced_receiver(instruction: &Instruction, state: &ProgramState) -> Option<SymbolicValue> {
    match &instruction.kind {
        InstructionKind::MemberAccess { .. } => state.peek_value(0),
        InstructionKind::Invocation {
            arg_count,
            is_instance: true,
            ..
        } => state.peek_value(*arg_count),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct NullPointerDereferenceCheck {
    report_issues: bool,
}

impl NullPointerDereferenceCheck {
    pub fn new() -> Self {
        Self {
            report_issues: true,
        }
    }

    /// Track accesses and post messages without reporting diagnostics.
    /// Used when only consumers of its messages are enabled.
    pub fn silent() -> Self {
        Self {
            report_issues: false,
        }
    }
}

impl Default for NullPointerDereferenceCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for NullPointerDereferenceCheck {
    fn name(&self) -> &'static str {
        "NullPointerDereference"
    }

    fn pre_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        let Some(instruction) = ctx.instruction() else {
            return Ok(Some(state));
        };
        // Stack underflow is a modeling gap the walker accounts for.
        let Some(receiver) = dereferenced_receiver(instruction, &state) else {
            return Ok(Some(state));
        };

        match state.constraint(&receiver, ConstraintFamily::Object) {
            Some(Constraint::NULL) => {
                if self.report_issues {
                    let name = ctx.describe(&state, &receiver);
                    ctx.report(NULL_POINTER_DEREFERENCE_RULE, MESSAGE, vec![name]);
                }
                Ok(None)
            }
            Some(_) => Ok(Some(state)),
            None => {
                if let Some(point) = ctx.point() {
                    let span = ctx.span();
                    ctx.post(CheckMessage::MemberAccessedUnresolved {
                        value: receiver.clone(),
                        point,
                        span,
                    });
                }
                Ok(state.set_constraint(&receiver, Constraint::NOT_NULL))
            }
        }
    }
}
