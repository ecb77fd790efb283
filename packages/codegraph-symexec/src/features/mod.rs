//! Feature modules (vertical slices)

pub mod checks;
pub mod exploded_graph;
pub mod program_state;
