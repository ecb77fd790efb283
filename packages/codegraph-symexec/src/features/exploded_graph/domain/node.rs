use crate::features::program_state::{ProgramPoint, ProgramState};

/// Worklist and visited-set entry: a program point paired with a state.
///
/// Two nodes are equal when their points are equal and their states are
/// structurally equal, which is what lets a walk reach a fixpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplodedGraphNode {
    pub point: ProgramPoint,
    pub state: ProgramState,
}

impl ExplodedGraphNode {
    pub fn new(point: ProgramPoint, state: ProgramState) -> Self {
        Self { point, state }
    }
}
