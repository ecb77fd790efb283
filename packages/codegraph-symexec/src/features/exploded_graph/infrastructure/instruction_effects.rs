//! Instruction effects on the operand stack and the constraint map
//!
//! Only the engine's own modeling lives here: what each instruction pops,
//! what it pushes, and the constraints that follow from the instruction
//! itself (a new object is not null). What checks learn from an
//! instruction is their business.

use crate::features::program_state::{Constraint, ProgramState, SymbolicValue, SymbolicValueFactory};
use crate::shared::models::{
    ComparisonOp, Instruction, InstructionKind, LiteralValue, MethodSemantics, Nullability, SymbolId,
    SymbolResolver,
};
use thiserror::Error;

/// Instruction the engine cannot model on the given state.
/// The path is dropped, the walk goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelingGap {
    #[error("stack underflow: {instruction} needs {needed} operand(s), {available} available")]
    StackUnderflow {
        instruction: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unresolved symbol {0}")]
    UnresolvedSymbol(SymbolId),
}

/// `Ok(None)`: the instruction cannot complete on this path
pub type EffectResult = Result<Option<ProgramState>, ModelingGap>;

/// Interpreter of [`InstructionKind`]s, allocating values from the walk's factory
pub struct InstructionEffects<'a, R: SymbolResolver + ?Sized> {
    symbols: &'a R,
    factory: &'a mut SymbolicValueFactory,
}

impl<'a, R: SymbolResolver + ?Sized> InstructionEffects<'a, R> {
    pub fn new(symbols: &'a R, factory: &'a mut SymbolicValueFactory) -> Self {
        Self { symbols, factory }
    }

    pub fn apply(&mut self, instruction: &Instruction, state: ProgramState) -> EffectResult {
        let kind = &instruction.kind;
        match kind {
            InstructionKind::Literal(literal) => Ok(Some(self.push_literal(literal, state))),
            InstructionKind::LoadSymbol(symbol) => self.load_symbol(*symbol, state).map(Some),
            InstructionKind::LoadThis => Ok(Some(state.push_value(SymbolicValue::this()))),
            InstructionKind::Assign(symbol) => {
                if self.symbols.resolve(*symbol).is_none() {
                    return Err(ModelingGap::UnresolvedSymbol(*symbol));
                }
                let (state, value) = pop(kind, &state, 1)?;
                Ok(Some(state.bind(*symbol, value[0].clone())))
            }
            InstructionKind::ObjectCreation { arg_count, .. } => {
                let (state, _) = pop(kind, &state, *arg_count)?;
                Ok(Some(self.push_not_null(state)))
            }
            InstructionKind::MemberAccess { .. } => {
                let (state, _) = pop(kind, &state, 1)?;
                Ok(Some(state.push_value(self.factory.fresh())))
            }
            InstructionKind::Invocation {
                method,
                arg_count,
                is_instance,
            } => {
                let receiver = usize::from(*is_instance);
                let (state, operands) = pop(kind, &state, arg_count + receiver)?;
                self.invoke(method.semantics, &operands[receiver..], state)
            }
            InstructionKind::Compare(op) => {
                let (state, operands) = pop(kind, &state, 2)?;
                let value = self
                    .factory
                    .comparison(*op, operands[0].clone(), operands[1].clone());
                Ok(Some(state.push_value(value)))
            }
            InstructionKind::LogicalNot => {
                let (state, operand) = pop(kind, &state, 1)?;
                let operand = operand[0].clone();
                let value = if operand == SymbolicValue::bool(true) {
                    SymbolicValue::bool(false)
                } else if operand == SymbolicValue::bool(false) {
                    SymbolicValue::bool(true)
                } else {
                    self.factory.not(operand)
                };
                Ok(Some(state.push_value(value)))
            }
            InstructionKind::Binary { .. } => {
                let (state, _) = pop(kind, &state, 2)?;
                Ok(Some(state.push_value(self.factory.fresh())))
            }
            InstructionKind::Cast { .. } => {
                // Identity preserving: only the operand's presence matters.
                if state.peek_value(0).is_none() {
                    return Err(underflow(kind, 1, 0));
                }
                Ok(Some(state))
            }
            InstructionKind::Pop => {
                let (state, _) = pop(kind, &state, 1)?;
                Ok(Some(state))
            }
            InstructionKind::Nop => Ok(Some(state)),
        }
    }

    fn push_literal(&mut self, literal: &LiteralValue, state: ProgramState) -> ProgramState {
        match literal {
            LiteralValue::Null => state.push_value(SymbolicValue::null()),
            LiteralValue::Bool(b) => state.push_value(SymbolicValue::bool(*b)),
            LiteralValue::Number(_) | LiteralValue::String(_) => self.push_not_null(state),
        }
    }

    /// Push a fresh value known not to be null
    fn push_not_null(&mut self, state: ProgramState) -> ProgramState {
        let value = self.factory.fresh();
        let pushed = state.push_value(value.clone());
        // A fresh value carries no constraint yet.
        match pushed.set_constraint(&value, Constraint::NOT_NULL) {
            Some(constrained) => constrained,
            None => pushed,
        }
    }

    /// Push the symbol's value, binding a fresh one on first read
    fn load_symbol(&mut self, symbol: SymbolId, state: ProgramState) -> Result<ProgramState, ModelingGap> {
        if let Some(value) = state.value_of(symbol) {
            return Ok(state.push_value(value.clone()));
        }
        let declared = self
            .symbols
            .resolve(symbol)
            .ok_or(ModelingGap::UnresolvedSymbol(symbol))?;

        let value = self.factory.fresh();
        let mut next = state.bind(symbol, value.clone()).push_value(value.clone());
        if declared.nullability == Nullability::NotNull {
            if let Some(constrained) = next.set_constraint(&value, Constraint::NOT_NULL) {
                next = constrained;
            }
        }
        Ok(next)
    }

    fn invoke(&mut self, semantics: MethodSemantics, args: &[SymbolicValue], state: ProgramState) -> EffectResult {
        match (semantics, args) {
            (MethodSemantics::ReferenceEquals, [left, right]) => {
                let value = self
                    .factory
                    .comparison(ComparisonOp::Equal, left.clone(), right.clone());
                Ok(Some(state.push_value(value)))
            }
            (MethodSemantics::IsNullOrEmpty, [operand]) => {
                let value = self.factory.null_or_empty(operand.clone());
                Ok(Some(state.push_value(value)))
            }
            (MethodSemantics::AssertNotNull, [checked, ..]) => {
                // A null argument throws: no normal successor on that path.
                let Some(state) = state.set_constraint(checked, Constraint::NOT_NULL) else {
                    return Ok(None);
                };
                Ok(Some(state.push_value(self.factory.fresh())))
            }
            _ => Ok(Some(state.push_value(self.factory.fresh()))),
        }
    }
}

fn underflow(kind: &InstructionKind, needed: usize, available: usize) -> ModelingGap {
    ModelingGap::StackUnderflow {
        instruction: kind.mnemonic(),
        needed,
        available,
    }
}

fn pop(kind: &InstructionKind, state: &ProgramState, count: usize) -> Result<(ProgramState, Vec<SymbolicValue>), ModelingGap> {
    state
        .pop_values(count)
        .ok_or_else(|| underflow(kind, count, state.stack_depth()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::program_state::{ConstraintFamily, ValueKind};
    use crate::shared::models::{MethodRef, Symbol, SymbolKind, SymbolTable};

    fn run(symbols: &SymbolTable, instructions: &[Instruction]) -> EffectResult {
        let mut factory = SymbolicValueFactory::new();
        let mut effects = InstructionEffects::new(symbols, &mut factory);
        let mut state = ProgramState::new();
        for instruction in instructions {
            match effects.apply(instruction, state)? {
                Some(next) => state = next,
                None => return Ok(None),
            }
        }
        Ok(Some(state))
    }

    #[test]
    fn test_assignment_aliases_the_value() {
        let mut symbols = SymbolTable::new();
        let x = symbols.parameter("x", Nullability::Unknown);
        let y = symbols.local("y");

        let state = run(&symbols, &[Instruction::load(x), Instruction::assign(y)])
            .unwrap()
            .unwrap();
        assert_eq!(state.value_of(x), state.value_of(y));
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn test_object_creation_is_not_null() {
        let symbols = SymbolTable::new();
        let state = run(&symbols, &[Instruction::number(1.0), Instruction::new_object("List", 1)])
            .unwrap()
            .unwrap();
        let created = state.peek_value(0).unwrap();
        assert!(state.has_constraint(&created, Constraint::NOT_NULL));
        assert_eq!(state.stack_depth(), 1);
    }

    #[test]
    fn test_instance_call_pops_receiver_and_arguments() {
        let mut symbols = SymbolTable::new();
        let x = symbols.parameter("x", Nullability::Unknown);
        let state = run(
            &symbols,
            &[
                Instruction::load(x),
                Instruction::number(1.0),
                Instruction::call(MethodRef::new("Add"), 1),
            ],
        )
        .unwrap()
        .unwrap();
        assert_eq!(state.stack_depth(), 1);
    }

    #[test]
    fn test_comparison_creates_relational_value() {
        let mut symbols = SymbolTable::new();
        let x = symbols.parameter("x", Nullability::Unknown);
        let state = run(&symbols, &[Instruction::load(x), Instruction::null(), Instruction::eq()])
            .unwrap()
            .unwrap();
        let top = state.peek_value(0).unwrap();
        assert!(matches!(top.kind(), ValueKind::Comparison { .. }));
    }

    #[test]
    fn test_not_of_literal_folds() {
        let symbols = SymbolTable::new();
        let state = run(&symbols, &[Instruction::bool(false), Instruction::not()])
            .unwrap()
            .unwrap();
        assert_eq!(state.peek_value(0), Some(SymbolicValue::bool(true)));
    }

    #[test]
    fn test_assert_not_null_constrains_argument() {
        let mut symbols = SymbolTable::new();
        let x = symbols.parameter("x", Nullability::Unknown);
        let guard = MethodRef::new("ThrowIfNull").with_semantics(MethodSemantics::AssertNotNull);

        let state = run(&symbols, &[Instruction::load(x), Instruction::static_call(guard.clone(), 1)])
            .unwrap()
            .unwrap();
        let value = state.value_of(x).unwrap();
        assert_eq!(state.constraint(value, ConstraintFamily::Object), Some(Constraint::NOT_NULL));

        let on_null = run(&symbols, &[Instruction::null(), Instruction::static_call(guard, 1)]).unwrap();
        assert!(on_null.is_none());
    }

    #[test]
    fn test_underflow_is_a_modeling_gap() {
        let symbols = SymbolTable::new();
        let err = run(&symbols, &[Instruction::pop()]).unwrap_err();
        assert_eq!(
            err,
            ModelingGap::StackUnderflow {
                instruction: "pop",
                needed: 1,
                available: 0
            }
        );
        assert!(matches!(
            run(&symbols, &[Instruction::cast("string")]),
            Err(ModelingGap::StackUnderflow { .. })
        ));
    }

    #[test]
    fn test_unresolved_symbol_is_a_modeling_gap() {
        let symbols = SymbolTable::new();
        assert_eq!(
            run(&symbols, &[Instruction::load(SymbolId(9))]),
            Err(ModelingGap::UnresolvedSymbol(SymbolId(9)))
        );
    }

    #[test]
    fn test_not_null_symbol_is_constrained_on_first_read() {
        let mut symbols = SymbolTable::new();
        let field = symbols.insert(
            Symbol::new(SymbolId(0), "cache", SymbolKind::Field).with_nullability(Nullability::NotNull),
        );
        let state = run(&symbols, &[Instruction::load(field)]).unwrap().unwrap();
        let value = state.peek_value(0).unwrap();
        assert!(state.has_constraint(&value, Constraint::NOT_NULL));
    }
}
