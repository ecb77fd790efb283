//! Application layer of the exploded graph feature

pub mod walker;

pub use walker::ExplodedGraphWalker;
