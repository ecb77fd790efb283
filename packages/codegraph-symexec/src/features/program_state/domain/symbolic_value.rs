//! Symbolic values
//!
//! A symbolic value is an identity token standing in for a runtime value.
//! Equality, ordering and hashing use the id only, so comparing two values
//! is a single integer comparison no matter what the value was built from.
//!
//! Relational values remember their operands (`x == null`, `!c`,
//! `string.IsNullOrEmpty(s)`); constraints learned on them are propagated
//! back into the operands by [`super::ProgramState::set_constraint`].

use crate::shared::models::ComparisonOp;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Numeric identity of a symbolic value within one walk
pub type ValueId = u32;

const THIS_ID: ValueId = 0;
const NULL_ID: ValueId = 1;
const TRUE_ID: ValueId = 2;
const FALSE_ID: ValueId = 3;

/// First id handed out by [`SymbolicValueFactory`]
pub const FIRST_FRESH_ID: ValueId = 4;

/// What a symbolic value was created from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Opaque value (variable content, call result, ...)
    Plain,
    /// The `this` reference
    This,
    /// The `null` literal
    Null,
    /// The `true` literal
    True,
    /// The `false` literal
    False,
    /// Result of `left op right`
    Comparison {
        op: ComparisonOp,
        left: SymbolicValue,
        right: SymbolicValue,
    },
    /// Result of `!operand`
    Not(SymbolicValue),
    /// Result of `string.IsNullOrEmpty(operand)`
    NullOrEmpty(SymbolicValue),
}

/// Identity token for an abstract runtime value
#[derive(Clone)]
pub struct SymbolicValue {
    id: ValueId,
    kind: Arc<ValueKind>,
}

impl SymbolicValue {
    fn singleton(id: ValueId, kind: ValueKind) -> Self {
        Self {
            id,
            kind: Arc::new(kind),
        }
    }

    pub fn this() -> Self {
        Self::singleton(THIS_ID, ValueKind::This)
    }

    pub fn null() -> Self {
        Self::singleton(NULL_ID, ValueKind::Null)
    }

    pub fn bool(value: bool) -> Self {
        if value {
            Self::singleton(TRUE_ID, ValueKind::True)
        } else {
            Self::singleton(FALSE_ID, ValueKind::False)
        }
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Well-known value shared by every state of every walk
    pub fn is_singleton(&self) -> bool {
        self.id < FIRST_FRESH_ID
    }

    /// Values this one was derived from
    pub fn operands(&self) -> Vec<&SymbolicValue> {
        match self.kind.as_ref() {
            ValueKind::Comparison { left, right, .. } => vec![left, right],
            ValueKind::Not(inner) | ValueKind::NullOrEmpty(inner) => vec![inner],
            _ => Vec::new(),
        }
    }
}

impl PartialEq for SymbolicValue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SymbolicValue {}

impl Hash for SymbolicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for SymbolicValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolicValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Debug for SymbolicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl std::fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind.as_ref() {
            ValueKind::This => write!(f, "SV_THIS"),
            ValueKind::Null => write!(f, "SV_NULL"),
            ValueKind::True => write!(f, "SV_TRUE"),
            ValueKind::False => write!(f, "SV_FALSE"),
            ValueKind::Plain => write!(f, "SV_{}", self.id),
            ValueKind::Comparison { op, left, right } => {
                let symbol = match op {
                    ComparisonOp::Equal => "==",
                    ComparisonOp::NotEqual => "!=",
                };
                write!(f, "SV_{}({} {} {})", self.id, left, symbol, right)
            }
            ValueKind::Not(inner) => write!(f, "SV_{}(!{})", self.id, inner),
            ValueKind::NullOrEmpty(inner) => write!(f, "SV_{}(IsNullOrEmpty {})", self.id, inner),
        }
    }
}

/// Walk-scoped allocator of fresh symbolic values
#[derive(Debug)]
pub struct SymbolicValueFactory {
    next: ValueId,
}

impl SymbolicValueFactory {
    pub fn new() -> Self {
        Self {
            next: FIRST_FRESH_ID,
        }
    }

    fn create(&mut self, kind: ValueKind) -> SymbolicValue {
        let id = self.next;
        self.next += 1;
        SymbolicValue {
            id,
            kind: Arc::new(kind),
        }
    }

    /// New opaque value
    pub fn fresh(&mut self) -> SymbolicValue {
        self.create(ValueKind::Plain)
    }

    pub fn comparison(
        &mut self,
        op: ComparisonOp,
        left: SymbolicValue,
        right: SymbolicValue,
    ) -> SymbolicValue {
        self.create(ValueKind::Comparison { op, left, right })
    }

    pub fn not(&mut self, operand: SymbolicValue) -> SymbolicValue {
        self.create(ValueKind::Not(operand))
    }

    pub fn null_or_empty(&mut self, operand: SymbolicValue) -> SymbolicValue {
        self.create(ValueKind::NullOrEmpty(operand))
    }

    /// Number of values created so far
    pub fn created(&self) -> u32 {
        self.next - FIRST_FRESH_ID
    }
}

impl Default for SymbolicValueFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_identity_based() {
        let mut factory = SymbolicValueFactory::new();
        let a = factory.fresh();
        let b = factory.fresh();

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(SymbolicValue::null(), SymbolicValue::null());
        assert_ne!(SymbolicValue::bool(true), SymbolicValue::bool(false));
    }

    #[test]
    fn test_fresh_values_never_collide_with_singletons() {
        let mut factory = SymbolicValueFactory::new();
        let value = factory.fresh();
        assert!(!value.is_singleton());
        assert!(SymbolicValue::this().is_singleton());
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_relational_operands() {
        let mut factory = SymbolicValueFactory::new();
        let x = factory.fresh();
        let cmp = factory.comparison(ComparisonOp::Equal, x.clone(), SymbolicValue::null());
        let not = factory.not(cmp.clone());

        assert_eq!(cmp.operands(), vec![&x, &SymbolicValue::null()]);
        assert_eq!(not.operands(), vec![&cmp]);
        assert!(x.operands().is_empty());
        assert!(cmp.to_string().contains("=="));
    }
}
