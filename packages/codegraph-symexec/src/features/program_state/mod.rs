// Program state and constraint engine
//
// Hexagonal Architecture:
// - domain: symbolic values, constraints, program points, immutable states
//
// Everything here is pure data: no I/O, no logging, no configuration.

pub mod domain;

pub use domain::{
    BoolConstraint, ConflictPolicy, Constraint, ConstraintFamily, ConstraintSet,
    DisposableConstraint, ObjectConstraint, ProgramPoint, ProgramState, SymbolicValue,
    SymbolicValueFactory, ValueId, ValueKind, FIRST_FRESH_ID,
};
