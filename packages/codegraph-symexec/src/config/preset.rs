//! Preset configurations
//!
//! Presets trade exploration depth for speed. Every preset enables all
//! built-in checks; they only differ in budgets.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI/CD: small budgets, loops unrolled once
    ///
    /// - max_explored_states=1_000, max_stack_depth=64
    /// - max_block_visits_per_path=1
    Fast,

    /// Development: default budgets
    ///
    /// - max_explored_states=10_000, max_stack_depth=256
    /// - max_block_visits_per_path=2
    #[default]
    Balanced,

    /// Audit: large budgets, loops unrolled four times
    ///
    /// - max_explored_states=100_000, max_stack_depth=1_024
    /// - max_block_visits_per_path=4
    Thorough,

    /// Custom: balanced defaults, meant to be overridden via YAML
    Custom,
}

impl Preset {
    /// Parse preset from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Some(Self::Fast),
            "balanced" => Some(Self::Balanced),
            "thorough" => Some(Self::Thorough),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
