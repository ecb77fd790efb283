//! Domain layer of the exploded graph feature

pub mod node;
pub mod outcome;

pub use node::ExplodedGraphNode;
pub use outcome::{AbortReason, CheckFault, ExplorationOutcome, ExplorationStats, ExplorationStatus};
