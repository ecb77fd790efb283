//! Domain layer of the program state feature

pub mod constraint;
pub mod program_point;
pub mod program_state;
pub mod symbolic_value;

pub use constraint::{
    BoolConstraint, ConflictPolicy, Constraint, ConstraintFamily, ConstraintSet,
    DisposableConstraint, ObjectConstraint,
};
pub use program_point::ProgramPoint;
pub use program_state::ProgramState;
pub use symbolic_value::{SymbolicValue, SymbolicValueFactory, ValueId, ValueKind, FIRST_FRESH_ID};
