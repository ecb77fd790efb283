//! Unchecked arguments of externally visible methods (S3900)
//!
//! Consumes the `MemberAccessedUnresolved` messages posted by
//! [`super::NullPointerDereferenceCheck`]: when the accessed value is the
//! value a parameter held on entry, the parameter was dereferenced before
//! any guard. One diagnostic per parameter, at its first such access.

use crate::features::checks::domain::{CheckMessage, InboxCursor};
use crate::features::checks::ports::{Check, CheckContext, CheckError, CheckResult};
use crate::features::program_state::{ProgramPoint, ProgramState};
use crate::shared::models::{Span, SymbolId, SymbolResolver};
use std::collections::BTreeMap;

pub const UNCHECKED_ARGUMENT_RULE: &str = "S3900";

const MESSAGE: &str = "Refactor this method to add validation of parameter '{0}' before using it.";

#[derive(Debug, Clone, Default)]
pub struct UncheckedArgumentCheck {
    cursor: InboxCursor,
    first_access: BTreeMap<SymbolId, (ProgramPoint, Option<Span>)>,
}

impl UncheckedArgumentCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn drain(&mut self, ctx: &CheckContext<'_>) {
        let method = ctx.method();
        if !method.accepts_external_arguments() {
            // Still advance so the log is not rescanned.
            self.cursor.read(ctx.inbox());
            return;
        }

        let initial = ctx.initial_state();
        for message in self.cursor.read(ctx.inbox()) {
            let CheckMessage::MemberAccessedUnresolved { value, point, span } = message;
            for parameter in &method.parameters {
                if initial.value_of(*parameter) != Some(value) {
                    continue;
                }
                self.first_access
                    .entry(*parameter)
                    .and_modify(|(first, first_span)| {
                        if *point < *first {
                            *first = *point;
                            *first_span = *span;
                        }
                    })
                    .or_insert((*point, *span));
            }
        }
    }
}

impl Check for UncheckedArgumentCheck {
    fn name(&self) -> &'static str {
        "UncheckedArgument"
    }

    fn post_process_instruction(&mut self, ctx: &mut CheckContext<'_>, state: ProgramState) -> CheckResult {
        self.drain(ctx);
        Ok(Some(state))
    }

    fn exploration_ended(&mut self, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        self.drain(ctx);
        let findings = std::mem::take(&mut self.first_access);
        for (parameter, (point, span)) in findings {
            let name = ctx.method().symbols.display_name(parameter);
            ctx.report_at(UNCHECKED_ARGUMENT_RULE, point, span, MESSAGE, vec![name]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::checks::domain::Inbox;
    use crate::features::program_state::SymbolicValueFactory;
    use crate::shared::models::{
        CfgBuilder, MethodBody, MethodKind, Nullability, SymbolTable, Terminator, Visibility,
    };

    fn method(visibility: Visibility, kind: MethodKind) -> (MethodBody, SymbolId) {
        let mut symbols = SymbolTable::new();
        let arg = symbols.parameter("arg", Nullability::Unknown);
        let mut b = CfgBuilder::new();
        b.block(vec![], Terminator::Exit);
        let method = MethodBody::new("M", b.build().unwrap(), symbols)
            .with_visibility(visibility)
            .with_kind(kind)
            .with_parameters(vec![arg]);
        (method, arg)
    }

    fn run(visibility: Visibility, kind: MethodKind) -> Vec<crate::features::checks::Diagnostic> {
        let (method, arg) = method(visibility, kind);
        let mut factory = SymbolicValueFactory::new();
        let initial = ProgramState::initial(vec![(arg, Nullability::Unknown)], &mut factory);
        let value = initial.value_of(arg).cloned().unwrap();

        let mut inbox = Inbox::new();
        for offset in [3, 1] {
            inbox.post(CheckMessage::MemberAccessedUnresolved {
                value: value.clone(),
                point: ProgramPoint::new(0, offset),
                span: None,
            });
        }
        inbox.post(CheckMessage::MemberAccessedUnresolved {
            value: factory.fresh(),
            point: ProgramPoint::new(0, 0),
            span: None,
        });

        let mut diagnostics = Vec::new();
        let mut ctx = CheckContext::new("UncheckedArgument", &method, &initial, &mut inbox, &mut diagnostics);
        UncheckedArgumentCheck::new().exploration_ended(&mut ctx).unwrap();
        diagnostics
    }

    #[test]
    fn test_public_method_reports_first_access_once() {
        let diagnostics = run(Visibility::Public, MethodKind::Ordinary);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].point, ProgramPoint::new(0, 1));
        assert_eq!(
            diagnostics[0].message(),
            "Refactor this method to add validation of parameter 'arg' before using it."
        );
    }

    #[test]
    fn test_private_method_is_ignored() {
        assert!(run(Visibility::Private, MethodKind::Ordinary).is_empty());
    }

    #[test]
    fn test_static_constructor_is_ignored() {
        assert!(run(Visibility::Public, MethodKind::StaticConstructor).is_empty());
        assert_eq!(run(Visibility::Public, MethodKind::Constructor).len(), 1);
    }
}
