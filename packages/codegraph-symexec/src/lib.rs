/*
 * Codegraph Symexec - Exploded Graph Symbolic Execution
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Front-end input model (CFG, instructions, symbols, spans)
 * - features/    : Vertical slices (program_state → exploded_graph → checks)
 * - config/      : Presets, validation, YAML
 * - api/         : Analyzer entry point for front ends
 *
 * Per method: explore (point, state) nodes until fixpoint or budget,
 * let pluggable checks observe every step, report their diagnostics.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Front-end input model
pub mod shared;

/// Feature modules (program state, exploded graph, checks)
pub mod features;

/// Configuration system (presets + YAML)
pub mod config;

/// Analyzer API
pub mod api;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use api::{AnalysisSummary, MethodReport, SymbolicExecutionAnalyzer};
pub use config::{Preset, SymexConfig, Validatable};
pub use errors::{Result, SymexError};
pub use features::checks::{Check, CheckContext, CheckError, CheckKind, CheckRegistry, Diagnostic};
pub use features::exploded_graph::{AbortReason, ExplodedGraphWalker, ExplorationOutcome, ExplorationStatus};
pub use features::program_state::{Constraint, ProgramPoint, ProgramState, SymbolicValue};
pub use shared::models::{CfgBuilder, ControlFlowGraph, Instruction, MethodBody, SymbolTable, Terminator};
