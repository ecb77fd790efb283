//! Error types for codegraph-symexec
//!
//! Provides unified error handling across the crate.
//!
//! Infeasible paths and modeling gaps are *not* errors: the walker expresses
//! them as pruned paths (`Option::None`) and statistics. Errors here are for
//! malformed input, invalid configuration and faulty checks.

use crate::config::ConfigError;
use crate::shared::models::CfgError;
use thiserror::Error;

/// Main error type for codegraph-symexec operations
#[derive(Debug, Error)]
pub enum SymexError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Control-flow graph handed over by the front end is malformed
    #[error("Invalid control-flow graph: {0}")]
    InvalidCfg(#[from] CfgError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A check failed while processing a method
    #[error("Check '{check}' failed: {message}")]
    Check { check: String, message: String },
}

impl SymexError {
    /// Create a check error
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        SymexError::Check {
            check: check.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for symexec operations
pub type Result<T> = std::result::Result<T, SymexError>;
