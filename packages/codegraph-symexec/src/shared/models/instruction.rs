//! Abstract instructions of a basic block
//!
//! Instructions operate on an evaluation stack: operands are pushed by
//! loads/literals and consumed by the instructions that use them. The front
//! end lowers expressions in evaluation order, e.g. `x.M(a)` becomes
//! `LoadSymbol(x), LoadSymbol(a), Invocation { arg_count: 1, is_instance: true }`.

use super::span::Span;
use super::symbol::SymbolId;
use serde::{Deserialize, Serialize};

/// Literal pushed by [`InstructionKind::Literal`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Equality operators understood by the constraint engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
}

impl ComparisonOp {
    pub fn negate(self) -> Self {
        match self {
            ComparisonOp::Equal => ComparisonOp::NotEqual,
            ComparisonOp::NotEqual => ComparisonOp::Equal,
        }
    }
}

/// Well-known method semantics the engine models beyond "returns something"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MethodSemantics {
    /// Ordinary call: result is a fresh unknown value
    #[default]
    Plain,
    /// `IDisposable.Dispose()` / `Close()` on the receiver
    Dispose,
    /// `object.ReferenceEquals(a, b)`
    ReferenceEquals,
    /// `string.IsNullOrEmpty(s)` / `IsNullOrWhiteSpace(s)`
    IsNullOrEmpty,
    /// Guard helper that throws when its single argument is null
    /// (`ArgumentNullException.ThrowIfNull(x)`, `Debug.Assert(x != null)`-style validators)
    AssertNotNull,
}

/// Invoked method as seen by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub name: String,
    #[serde(default)]
    pub semantics: MethodSemantics,
}

impl MethodRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantics: MethodSemantics::Plain,
        }
    }

    pub fn with_semantics(mut self, semantics: MethodSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn dispose() -> Self {
        Self::new("Dispose").with_semantics(MethodSemantics::Dispose)
    }
}

/// Instruction kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Push a literal
    Literal(LiteralValue),
    /// Push the value bound to a symbol (fresh value on first read)
    LoadSymbol(SymbolId),
    /// Push the `this` reference
    LoadThis,
    /// Pop a value and bind it to a symbol
    Assign(SymbolId),
    /// Pop `arg_count` arguments, push a new non-null object
    ObjectCreation { type_name: String, arg_count: usize },
    /// Pop the receiver, push the member value
    MemberAccess { member: String },
    /// Pop arguments (and the receiver when `is_instance`), push the result
    Invocation {
        method: MethodRef,
        arg_count: usize,
        is_instance: bool,
    },
    /// Pop two operands, push the comparison result
    Compare(ComparisonOp),
    /// Pop a boolean, push its negation
    LogicalNot,
    /// Pop two operands, push an unknown result
    Binary { operator: String },
    /// Reference conversion: the value keeps its identity
    Cast { type_name: String },
    /// Discard the top of the stack
    Pop,
    Nop,
}

impl InstructionKind {
    /// Instructions that can raise an exception and therefore flow into
    /// exception handlers of the enclosing block
    pub fn may_throw(&self) -> bool {
        matches!(
            self,
            InstructionKind::MemberAccess { .. }
                | InstructionKind::Invocation { .. }
                | InstructionKind::ObjectCreation { .. }
                | InstructionKind::Cast { .. }
        )
    }

    /// Short mnemonic for logging
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InstructionKind::Literal(_) => "literal",
            InstructionKind::LoadSymbol(_) => "load",
            InstructionKind::LoadThis => "this",
            InstructionKind::Assign(_) => "assign",
            InstructionKind::ObjectCreation { .. } => "new",
            InstructionKind::MemberAccess { .. } => "member",
            InstructionKind::Invocation { .. } => "call",
            InstructionKind::Compare(_) => "cmp",
            InstructionKind::LogicalNot => "not",
            InstructionKind::Binary { .. } => "binary",
            InstructionKind::Cast { .. } => "cast",
            InstructionKind::Pop => "pop",
            InstructionKind::Nop => "nop",
        }
    }
}

/// Instruction with its source position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    #[serde(default)]
    pub span: Option<Span>,
}

impl Instruction {
    pub fn new(kind: InstructionKind) -> Self {
        Self { kind, span: None }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn null() -> Self {
        Self::new(InstructionKind::Literal(LiteralValue::Null))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(InstructionKind::Literal(LiteralValue::Bool(value)))
    }

    pub fn number(value: f64) -> Self {
        Self::new(InstructionKind::Literal(LiteralValue::Number(value)))
    }

    pub fn load(symbol: SymbolId) -> Self {
        Self::new(InstructionKind::LoadSymbol(symbol))
    }

    pub fn this() -> Self {
        Self::new(InstructionKind::LoadThis)
    }

    pub fn assign(symbol: SymbolId) -> Self {
        Self::new(InstructionKind::Assign(symbol))
    }

    pub fn new_object(type_name: impl Into<String>, arg_count: usize) -> Self {
        Self::new(InstructionKind::ObjectCreation {
            type_name: type_name.into(),
            arg_count,
        })
    }

    pub fn member(member: impl Into<String>) -> Self {
        Self::new(InstructionKind::MemberAccess {
            member: member.into(),
        })
    }

    /// Instance call on the receiver below the arguments
    pub fn call(method: MethodRef, arg_count: usize) -> Self {
        Self::new(InstructionKind::Invocation {
            method,
            arg_count,
            is_instance: true,
        })
    }

    pub fn static_call(method: MethodRef, arg_count: usize) -> Self {
        Self::new(InstructionKind::Invocation {
            method,
            arg_count,
            is_instance: false,
        })
    }

    pub fn eq() -> Self {
        Self::new(InstructionKind::Compare(ComparisonOp::Equal))
    }

    pub fn ne() -> Self {
        Self::new(InstructionKind::Compare(ComparisonOp::NotEqual))
    }

    pub fn not() -> Self {
        Self::new(InstructionKind::LogicalNot)
    }

    pub fn binary(operator: impl Into<String>) -> Self {
        Self::new(InstructionKind::Binary {
            operator: operator.into(),
        })
    }

    pub fn cast(type_name: impl Into<String>) -> Self {
        Self::new(InstructionKind::Cast {
            type_name: type_name.into(),
        })
    }

    pub fn pop() -> Self {
        Self::new(InstructionKind::Pop)
    }

    pub fn nop() -> Self {
        Self::new(InstructionKind::Nop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_may_throw() {
        assert!(Instruction::member("Length").kind.may_throw());
        assert!(Instruction::call(MethodRef::new("M"), 0).kind.may_throw());
        assert!(!Instruction::load(SymbolId(0)).kind.may_throw());
        assert!(!Instruction::eq().kind.may_throw());
    }

    #[test]
    fn test_instruction_json_shape() {
        let instruction = Instruction::call(MethodRef::dispose(), 0).with_span(Span::line(4, 8, 20));
        let json = serde_json::to_string(&instruction).unwrap();
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instruction);
        assert!(json.contains("Dispose"));
    }

    #[test]
    fn test_comparison_negate() {
        assert_eq!(ComparisonOp::Equal.negate(), ComparisonOp::NotEqual);
        assert_eq!(ComparisonOp::NotEqual.negate(), ComparisonOp::Equal);
    }
}
