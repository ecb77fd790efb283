//! Object disposed (S3966)
//!
//! A newly created object starts `NotDisposed`; `Dispose()` marks the
//! receiver `Disposed`. Disposing it again, or using one of its members
//! afterwards, is reported. Disposal is a state change, so the constraint
//! replaces `NotDisposed` instead of pruning.

use super::null_pointer::dereferenced_receiver;
use crate::features::checks::ports::{Check, CheckContext, CheckResult};
use crate::features::program_state::{Constraint, ProgramState};
use crate::shared::models::{InstructionKind, MethodSemantics};

pub const OBJECT_DISPOSED_RULE: &str = "S3966";

const DISPOSED_TWICE: &str = "Resource '{0}' has already been disposed explicitly or through a using statement implicitly. Remove the redundant disposal.";
const ACCESSED_AFTER_DISPOSE: &str = "'{0}' is accessed after being disposed.";

#[derive(Debug, Clone, Default)]
pub struct ObjectDisposedCheck;

impl ObjectDisposedCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for ObjectDisposedCheck {
    fn name(&self) -> &'static str {
        "ObjectDisposed"
    }

    fn pre_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        let Some(instruction) = ctx.instruction() else {
            return Ok(Some(state));
        };
        let Some(receiver) = dereferenced_receiver(instruction, &state) else {
            return Ok(Some(state));
        };

        let is_dispose = matches!(
            &instruction.kind,
            InstructionKind::Invocation { method, .. } if method.semantics == MethodSemantics::Dispose
        );
        let already_disposed = state.has_constraint(&receiver, Constraint::DISPOSED);

        if already_disposed {
            let name = ctx.describe(&state, &receiver);
            let template = if is_dispose {
                DISPOSED_TWICE
            } else {
                ACCESSED_AFTER_DISPOSE
            };
            ctx.report(OBJECT_DISPOSED_RULE, template, vec![name]);
            return Ok(Some(state));
        }

        if is_dispose {
            return Ok(state.set_constraint(&receiver, Constraint::DISPOSED));
        }
        Ok(Some(state))
    }

    fn post_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        let created = matches!(
            ctx.instruction().map(|i| &i.kind),
            Some(InstructionKind::ObjectCreation { .. })
        );
        match state.peek_value(0) {
            Some(object) if created => Ok(state.set_constraint(&object, Constraint::NOT_DISPOSED)),
            _ => Ok(Some(state)),
        }
    }
}
