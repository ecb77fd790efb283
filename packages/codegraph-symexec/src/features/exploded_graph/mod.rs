// Exploded graph: worklist exploration of (program point, program state) nodes
//
// Hexagonal Architecture:
// - domain: nodes, walk outcome, abort reasons, statistics
// - infrastructure: instruction effects on the program state
// - application: ExplodedGraphWalker (worklist, branching, budgets, check dispatch)

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ExplodedGraphWalker;
pub use domain::{AbortReason, CheckFault, ExplodedGraphNode, ExplorationOutcome, ExplorationStats, ExplorationStatus};
pub use infrastructure::{EffectResult, InstructionEffects, ModelingGap};
