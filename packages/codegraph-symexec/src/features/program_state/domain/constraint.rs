//! Constraints and constraint families
//!
//! A constraint is a fact about a symbolic value. Constraints are grouped
//! into families whose members exclude each other: a value is never both
//! `Null` and `NotNull`. Different families apply independently, so a value
//! can be `NotNull` and `Disposed` at the same time.

use super::symbolic_value::ValueKind;
use serde::{Deserialize, Serialize};

/// Nullness of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectConstraint {
    Null,
    NotNull,
}

impl ObjectConstraint {
    pub fn opposite(self) -> Self {
        match self {
            ObjectConstraint::Null => ObjectConstraint::NotNull,
            ObjectConstraint::NotNull => ObjectConstraint::Null,
        }
    }
}

/// Truth value of a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoolConstraint {
    True,
    False,
}

impl BoolConstraint {
    pub fn from_bool(value: bool) -> Self {
        if value {
            BoolConstraint::True
        } else {
            BoolConstraint::False
        }
    }

    pub fn as_bool(self) -> bool {
        self == BoolConstraint::True
    }

    pub fn opposite(self) -> Self {
        Self::from_bool(!self.as_bool())
    }
}

/// Disposal status of an `IDisposable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisposableConstraint {
    Disposed,
    NotDisposed,
}

/// What happens when a constraint conflicts with the one already held
/// for the same family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// The facts contradict each other: the path is infeasible
    Prune,
    /// The new constraint describes a state change and replaces the old one
    Replace,
}

/// Mutually exclusive group of constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintFamily {
    Object,
    Bool,
    Disposable,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 3] = [
        ConstraintFamily::Object,
        ConstraintFamily::Bool,
        ConstraintFamily::Disposable,
    ];

    fn slot(self) -> usize {
        match self {
            ConstraintFamily::Object => 0,
            ConstraintFamily::Bool => 1,
            ConstraintFamily::Disposable => 2,
        }
    }

    pub fn conflict_policy(self) -> ConflictPolicy {
        match self {
            ConstraintFamily::Object | ConstraintFamily::Bool => ConflictPolicy::Prune,
            ConstraintFamily::Disposable => ConflictPolicy::Replace,
        }
    }
}

/// Tagged fact attachable to a symbolic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constraint {
    Object(ObjectConstraint),
    Bool(BoolConstraint),
    Disposable(DisposableConstraint),
}

impl Constraint {
    pub const NULL: Constraint = Constraint::Object(ObjectConstraint::Null);
    pub const NOT_NULL: Constraint = Constraint::Object(ObjectConstraint::NotNull);
    pub const TRUE: Constraint = Constraint::Bool(BoolConstraint::True);
    pub const FALSE: Constraint = Constraint::Bool(BoolConstraint::False);
    pub const DISPOSED: Constraint = Constraint::Disposable(DisposableConstraint::Disposed);
    pub const NOT_DISPOSED: Constraint = Constraint::Disposable(DisposableConstraint::NotDisposed);

    pub fn family(&self) -> ConstraintFamily {
        match self {
            Constraint::Object(_) => ConstraintFamily::Object,
            Constraint::Bool(_) => ConstraintFamily::Bool,
            Constraint::Disposable(_) => ConstraintFamily::Disposable,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Constraint::Bool(BoolConstraint::from_bool(value))
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Object(ObjectConstraint::Null) => write!(f, "Null"),
            Constraint::Object(ObjectConstraint::NotNull) => write!(f, "NotNull"),
            Constraint::Bool(BoolConstraint::True) => write!(f, "True"),
            Constraint::Bool(BoolConstraint::False) => write!(f, "False"),
            Constraint::Disposable(DisposableConstraint::Disposed) => write!(f, "Disposed"),
            Constraint::Disposable(DisposableConstraint::NotDisposed) => write!(f, "NotDisposed"),
        }
    }
}

/// At most one constraint per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConstraintSet {
    slots: [Option<Constraint>; 3],
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints a value carries by construction (singletons)
    pub fn intrinsic(kind: &ValueKind) -> Self {
        let mut set = Self::new();
        match kind {
            ValueKind::Null => set.put(Constraint::NULL),
            ValueKind::This => set.put(Constraint::NOT_NULL),
            ValueKind::True => {
                set.put(Constraint::NOT_NULL);
                set.put(Constraint::TRUE);
            }
            ValueKind::False => {
                set.put(Constraint::NOT_NULL);
                set.put(Constraint::FALSE);
            }
            _ => {}
        }
        set
    }

    fn put(&mut self, constraint: Constraint) {
        self.slots[constraint.family().slot()] = Some(constraint);
    }

    pub fn get(&self, family: ConstraintFamily) -> Option<Constraint> {
        self.slots[family.slot()]
    }

    pub fn contains(&self, constraint: Constraint) -> bool {
        self.get(constraint.family()) == Some(constraint)
    }

    /// Add `constraint` following its family's conflict policy.
    ///
    /// Returns `None` when the family prunes conflicts and a different
    /// constraint of the same family is already present.
    pub fn apply(&self, constraint: Constraint) -> Option<Self> {
        let family = constraint.family();
        match self.get(family) {
            Some(existing) if existing == constraint => Some(*self),
            Some(_) if family.conflict_policy() == ConflictPolicy::Prune => None,
            _ => {
                let mut next = *self;
                next.put(constraint);
                Some(next)
            }
        }
    }

    pub fn without(&self, family: ConstraintFamily) -> Self {
        let mut next = *self;
        next.slots[family.slot()] = None;
        next
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = Constraint> + '_ {
        self.slots.iter().flatten().copied()
    }
}

impl std::fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
