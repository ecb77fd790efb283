//! Infrastructure layer of the exploded graph feature

pub mod instruction_effects;

pub use instruction_effects::{EffectResult, InstructionEffects, ModelingGap};
