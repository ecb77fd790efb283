//! Core API
//!
//! Entry point for front ends: hand over method bodies, get diagnostics back.
//! No front-end specific types cross this boundary.

pub mod analyzer;

pub use analyzer::{AnalysisSummary, MethodReport, SymbolicExecutionAnalyzer};
