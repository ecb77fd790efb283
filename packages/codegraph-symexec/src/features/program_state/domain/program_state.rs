//! Program State
//!
//! Immutable snapshot of the abstract machine at one program point:
//!
//! - operand stack of symbolic values (expression evaluation)
//! - symbol → symbolic value bindings (variables, parameters, fields)
//! - symbolic value → constraint set
//! - per-path block visit counts (loop unrolling bound)
//!
//! Every collection is a persistent `rpds` structure, so deriving a new state
//! shares almost all of its memory with the previous one. Equality and
//! hashing are structural: two states built along different paths compare
//! equal when their contents match, which is what lets the walker detect
//! already-explored nodes and reach a fixpoint.

use super::constraint::{Constraint, ConstraintFamily, ConstraintSet};
use super::symbolic_value::{SymbolicValue, SymbolicValueFactory, ValueKind};
use crate::shared::models::{BlockId, ComparisonOp, Nullability, SymbolId};
use rpds::{ListSync, RedBlackTreeMapSync};
use rustc_hash::FxHashSet;
use std::hash::{Hash, Hasher};

/// Bound on relational propagation chains (`!!!(x == null)`)
const MAX_PROPAGATION_DEPTH: usize = 16;

/// Immutable, structurally shared program state
#[derive(Clone)]
pub struct ProgramState {
    /// Operand stack, top first
    stack: ListSync<SymbolicValue>,
    bindings: RedBlackTreeMapSync<SymbolId, SymbolicValue>,
    constraints: RedBlackTreeMapSync<SymbolicValue, ConstraintSet>,
    visits: RedBlackTreeMapSync<BlockId, u32>,
}

impl ProgramState {
    /// Empty state: empty stack, no bindings, no learned constraints
    pub fn new() -> Self {
        Self {
            stack: ListSync::new_sync(),
            bindings: RedBlackTreeMapSync::new_sync(),
            constraints: RedBlackTreeMapSync::new_sync(),
            visits: RedBlackTreeMapSync::new_sync(),
        }
    }

    /// Entry state of a method: each parameter is bound to a fresh value,
    /// constrained according to its declared nullability.
    pub fn initial<I>(parameters: I, factory: &mut SymbolicValueFactory) -> Self
    where
        I: IntoIterator<Item = (SymbolId, Nullability)>,
    {
        let mut state = Self::new();
        for (symbol, nullability) in parameters {
            let value = factory.fresh();
            state = state.bind(symbol, value.clone());
            if nullability == Nullability::NotNull {
                // A fresh value has no constraints, so this cannot contradict.
                if let Some(next) = state.set_constraint(&value, Constraint::NOT_NULL) {
                    state = next;
                }
            }
        }
        state
    }

    // ───────────────────────────── operand stack ─────────────────────────────

    pub fn push_value(&self, value: SymbolicValue) -> Self {
        Self {
            stack: self.stack.push_front(value),
            ..self.clone()
        }
    }

    /// Pop the top of the stack; `None` on underflow (modeling gap)
    pub fn pop_value(&self) -> Option<(Self, SymbolicValue)> {
        let value = self.stack.first()?.clone();
        let stack = self.stack.drop_first()?;
        Some((
            Self {
                stack,
                ..self.clone()
            },
            value,
        ))
    }

    /// Pop `count` values, returned in push order (deepest first).
    /// `None` if the stack holds fewer than `count` values.
    pub fn pop_values(&self, count: usize) -> Option<(Self, Vec<SymbolicValue>)> {
        if self.stack.len() < count {
            return None;
        }
        let mut state = self.clone();
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let (next, value) = state.pop_value()?;
            values.push(value);
            state = next;
        }
        values.reverse();
        Some((state, values))
    }

    /// Read the value `offset` entries below the top without popping
    pub fn peek_value(&self, offset: usize) -> Option<SymbolicValue> {
        self.stack.iter().nth(offset).cloned()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear_stack(&self) -> Self {
        Self {
            stack: ListSync::new_sync(),
            ..self.clone()
        }
    }

    // ──────────────────────────────── bindings ───────────────────────────────

    pub fn value_of(&self, symbol: SymbolId) -> Option<&SymbolicValue> {
        self.bindings.get(&symbol)
    }

    /// Bind `symbol` to `value`. Re-assignment replaces the old binding, the
    /// old value keeps its constraints for any alias still referencing it.
    pub fn bind(&self, symbol: SymbolId, value: SymbolicValue) -> Self {
        Self {
            bindings: self.bindings.insert(symbol, value),
            ..self.clone()
        }
    }

    /// Symbols currently bound to `value`
    pub fn symbols_of<'a>(&'a self, value: &'a SymbolicValue) -> impl Iterator<Item = SymbolId> + 'a {
        self.bindings
            .iter()
            .filter(move |(_, v)| *v == value)
            .map(|(s, _)| *s)
    }

    // ────────────────────────────── constraints ──────────────────────────────

    /// Constraints of `value`, including the intrinsic ones of singletons
    pub fn constraints_of(&self, value: &SymbolicValue) -> ConstraintSet {
        self.constraints
            .get(value)
            .copied()
            .unwrap_or_else(|| ConstraintSet::intrinsic(value.kind()))
    }

    pub fn constraint(&self, value: &SymbolicValue, family: ConstraintFamily) -> Option<Constraint> {
        self.constraints_of(value).get(family)
    }

    pub fn has_constraint(&self, value: &SymbolicValue, constraint: Constraint) -> bool {
        self.constraints_of(value).contains(constraint)
    }

    /// Apply `constraint` to `value`.
    ///
    /// Returns `None` when the constraint contradicts what is already known
    /// (about `value` itself or, through relational values, about its
    /// operands): the caller must discard the path.
    pub fn set_constraint(&self, value: &SymbolicValue, constraint: Constraint) -> Option<Self> {
        self.set_constraint_at_depth(value, constraint, 0)
    }

    fn set_constraint_at_depth(
        &self,
        value: &SymbolicValue,
        constraint: Constraint,
        depth: usize,
    ) -> Option<Self> {
        let current = self.constraints_of(value);
        if current.contains(constraint) {
            return Some(self.clone());
        }
        let updated = current.apply(constraint)?;
        let state = Self {
            constraints: self.constraints.insert(value.clone(), updated),
            ..self.clone()
        };

        if depth >= MAX_PROPAGATION_DEPTH {
            return Some(state);
        }

        match (value.kind(), constraint) {
            (ValueKind::Not(operand), Constraint::Bool(b)) => {
                state.set_constraint_at_depth(operand, Constraint::Bool(b.opposite()), depth + 1)
            }
            (ValueKind::Comparison { op, left, right }, Constraint::Bool(b)) => {
                let equal = (*op == ComparisonOp::Equal) == b.as_bool();
                state.learn_equality(left, right, equal, depth + 1)
            }
            (ValueKind::NullOrEmpty(operand), Constraint::FALSE) => {
                state.set_constraint_at_depth(operand, Constraint::NOT_NULL, depth + 1)
            }
            _ => Some(state),
        }
    }

    /// Propagate `left == right` (or `left != right`) into the operands
    fn learn_equality(
        &self,
        left: &SymbolicValue,
        right: &SymbolicValue,
        equal: bool,
        depth: usize,
    ) -> Option<Self> {
        if left == right {
            return if equal { Some(self.clone()) } else { None };
        }

        let mut state = self.clone();
        if equal {
            for family in [ConstraintFamily::Object, ConstraintFamily::Bool] {
                if let Some(c) = state.constraint(left, family) {
                    state = state.set_constraint_at_depth(right, c, depth)?;
                }
                if let Some(c) = state.constraint(right, family) {
                    state = state.set_constraint_at_depth(left, c, depth)?;
                }
            }
        } else {
            if state.has_constraint(left, Constraint::NULL) {
                state = state.set_constraint_at_depth(right, Constraint::NOT_NULL, depth)?;
            }
            if state.has_constraint(right, Constraint::NULL) {
                state = state.set_constraint_at_depth(left, Constraint::NOT_NULL, depth)?;
            }
            if let Some(Constraint::Bool(b)) = state.constraint(left, ConstraintFamily::Bool) {
                state = state.set_constraint_at_depth(right, Constraint::Bool(b.opposite()), depth)?;
            }
            if let Some(Constraint::Bool(b)) = state.constraint(right, ConstraintFamily::Bool) {
                state = state.set_constraint_at_depth(left, Constraint::Bool(b.opposite()), depth)?;
            }
        }
        Some(state)
    }

    /// Forget the `family` constraint of `value`
    pub fn remove_constraint_family(&self, value: &SymbolicValue, family: ConstraintFamily) -> Self {
        match self.constraints.get(value) {
            Some(set) => {
                let remaining = set.without(family);
                let constraints = if remaining.is_empty() {
                    self.constraints.remove(value)
                } else {
                    self.constraints.insert(value.clone(), remaining)
                };
                Self {
                    constraints,
                    ..self.clone()
                }
            }
            None => self.clone(),
        }
    }

    /// Values with explicitly learned constraints
    pub fn constrained_values(&self) -> impl Iterator<Item = (&SymbolicValue, &ConstraintSet)> {
        self.constraints.iter()
    }

    // ─────────────────────────────── visit counts ────────────────────────────

    pub fn visit_count(&self, block: BlockId) -> u32 {
        self.visits.get(&block).copied().unwrap_or(0)
    }

    pub fn record_visit(&self, block: BlockId) -> Self {
        Self {
            visits: self.visits.insert(block, self.visit_count(block) + 1),
            ..self.clone()
        }
    }

    // ─────────────────────────── garbage collection ──────────────────────────

    /// Drop constraints of values no longer reachable from the stack, the
    /// bindings or the singletons. Singletons stay live: `LoadThis` and
    /// literals reach them again without a binding.
    pub fn collect_garbage(&self) -> Self {
        let mut live: FxHashSet<SymbolicValue> = FxHashSet::default();
        let mut pending: Vec<SymbolicValue> = self
            .stack
            .iter()
            .chain(self.bindings.values())
            .chain(self.constraints.keys().filter(|v| v.is_singleton()))
            .cloned()
            .collect();

        while let Some(value) = pending.pop() {
            if live.contains(&value) {
                continue;
            }
            pending.extend(value.operands().into_iter().cloned());
            live.insert(value);
        }

        let dead: Vec<SymbolicValue> = self
            .constraints
            .keys()
            .filter(|v| !live.contains(*v))
            .cloned()
            .collect();
        if dead.is_empty() {
            return self.clone();
        }

        let mut constraints = self.constraints.clone();
        for value in &dead {
            constraints.remove_mut(value);
        }
        Self {
            constraints,
            ..self.clone()
        }
    }
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        self.stack.len() == other.stack.len()
            && self.constraints.size() == other.constraints.size()
            && self.bindings.size() == other.bindings.size()
            && self.stack.iter().eq(other.stack.iter())
            && self.bindings.iter().eq(other.bindings.iter())
            && self.constraints.iter().eq(other.constraints.iter())
            && self.visits.iter().eq(other.visits.iter())
    }
}

impl Eq for ProgramState {}

impl Hash for ProgramState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stack.len().hash(state);
        for value in self.stack.iter() {
            value.hash(state);
        }
        for (symbol, value) in self.bindings.iter() {
            symbol.hash(state);
            value.hash(state);
        }
        for (value, set) in self.constraints.iter() {
            value.hash(state);
            set.hash(state);
        }
        for (block, count) in self.visits.iter() {
            block.hash(state);
            count.hash(state);
        }
    }
}

impl std::fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramState")
            .field("stack", &self.stack.iter().collect::<Vec<_>>())
            .field("bindings", &self.bindings.iter().collect::<Vec<_>>())
            .field(
                "constraints",
                &self
                    .constraints
                    .iter()
                    .map(|(v, c)| format!("{} {}", v, c))
                    .collect::<Vec<_>>(),
            )
            .field("visits", &self.visits.iter().collect::<Vec<_>>())
            .finish()
    }
}
