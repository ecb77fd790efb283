//! Engine configuration
//!
//! Budgets bound a single method walk. Exceeding `max_explored_states` or
//! `max_stack_depth` ends the walk as incomplete; `max_block_visits_per_path`
//! silently drops paths that keep spinning in a loop.

use super::error::ConfigResult;
use super::preset::Preset;
use super::validation::{check_range, Validatable};
use serde::{Deserialize, Serialize};

/// Which built-in checks a walk registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckToggles {
    pub null_pointer_dereference: bool,
    pub object_disposed: bool,
    pub unchecked_argument: bool,
    pub constant_condition: bool,
}

impl CheckToggles {
    pub fn all() -> Self {
        Self {
            null_pointer_dereference: true,
            object_disposed: true,
            unchecked_argument: true,
            constant_condition: true,
        }
    }

    pub fn none() -> Self {
        Self {
            null_pointer_dereference: false,
            object_disposed: false,
            unchecked_argument: false,
            constant_condition: false,
        }
    }

    pub fn enabled_count(&self) -> usize {
        [
            self.null_pointer_dereference,
            self.object_disposed,
            self.unchecked_argument,
            self.constant_condition,
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }
}

impl Default for CheckToggles {
    fn default() -> Self {
        Self::all()
    }
}

/// Symbolic execution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymexConfig {
    /// Maximum distinct (point, state) nodes per walk
    pub max_explored_states: usize,

    /// Maximum operand stack depth of any state
    pub max_stack_depth: usize,

    /// Per-path bound on entries into the same loop head (loop unrolling)
    pub max_block_visits_per_path: u32,

    /// Drop constraints of unreachable values at block entries
    pub collect_garbage: bool,

    /// Catch panics raised by checks and treat them as check faults
    pub isolate_check_panics: bool,

    pub checks: CheckToggles,
}

impl SymexConfig {
    pub const MAX_EXPLORED_STATES_LIMIT: usize = 10_000_000;
    pub const MAX_STACK_DEPTH_LIMIT: usize = 65_536;
    pub const MAX_BLOCK_VISITS_LIMIT: u32 = 64;

    /// Create config from preset
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                max_explored_states: 1_000,
                max_stack_depth: 64,
                max_block_visits_per_path: 1,
                collect_garbage: true,
                isolate_check_panics: true,
                checks: CheckToggles::all(),
            },
            Preset::Balanced | Preset::Custom => Self {
                max_explored_states: 10_000,
                max_stack_depth: 256,
                max_block_visits_per_path: 2,
                collect_garbage: true,
                isolate_check_panics: true,
                checks: CheckToggles::all(),
            },
            Preset::Thorough => Self {
                max_explored_states: 100_000,
                max_stack_depth: 1_024,
                max_block_visits_per_path: 4,
                collect_garbage: true,
                isolate_check_panics: true,
                checks: CheckToggles::all(),
            },
        }
    }

    /// Builder: Set max_explored_states
    pub fn max_explored_states(mut self, v: usize) -> Self {
        self.max_explored_states = v;
        self
    }

    /// Builder: Set max_stack_depth
    pub fn max_stack_depth(mut self, v: usize) -> Self {
        self.max_stack_depth = v;
        self
    }

    /// Builder: Set max_block_visits_per_path
    pub fn max_block_visits_per_path(mut self, v: u32) -> Self {
        self.max_block_visits_per_path = v;
        self
    }

    /// Builder: Set collect_garbage
    pub fn collect_garbage(mut self, v: bool) -> Self {
        self.collect_garbage = v;
        self
    }

    /// Builder: Set isolate_check_panics
    pub fn isolate_check_panics(mut self, v: bool) -> Self {
        self.isolate_check_panics = v;
        self
    }

    /// Builder: Set checks
    pub fn checks(mut self, v: CheckToggles) -> Self {
        self.checks = v;
        self
    }
}

impl Default for SymexConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for SymexConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "max_explored_states",
            self.max_explored_states,
            1,
            Self::MAX_EXPLORED_STATES_LIMIT,
            "The walk needs room for at least the entry node",
        )?;
        check_range(
            "max_stack_depth",
            self.max_stack_depth,
            1,
            Self::MAX_STACK_DEPTH_LIMIT,
            "Expression evaluation needs at least one stack slot",
        )?;
        check_range(
            "max_block_visits_per_path",
            self.max_block_visits_per_path,
            1,
            Self::MAX_BLOCK_VISITS_LIMIT,
            "Every block must be enterable at least once per path",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SymexConfig"
    }
}
