//! SymbolicExecutionAnalyzer - one walk per method body
//!
//! Design principles:
//! - Validated configuration, checked once at construction
//! - Fresh check instances per walk (checks hold walk-local state)
//! - Method walks are independent and run on the rayon pool with `parallel`

use crate::config::{SymexConfig, Validatable};
use crate::errors::Result;
use crate::features::checks::{CheckRegistry, Diagnostic};
use crate::features::exploded_graph::{ExplodedGraphWalker, ExplorationOutcome};
use crate::shared::models::MethodBody;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════
// Reports
// ═══════════════════════════════════════════════════════════════════════════

/// Outcome of one method walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodReport {
    pub method: String,
    pub outcome: ExplorationOutcome,
}

impl MethodReport {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.outcome.diagnostics
    }
}

/// Aggregate over a batch of method reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub methods: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub diagnostics: usize,
    /// Methods where at least one check faulted
    pub faulted: usize,
}

impl AnalysisSummary {
    pub fn from_reports(reports: &[MethodReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.methods += 1;
            if report.outcome.is_complete() {
                summary.completed += 1;
            } else {
                summary.incomplete += 1;
            }
            summary.diagnostics += report.outcome.diagnostics.len();
            if !report.outcome.faulted_checks.is_empty() {
                summary.faulted += 1;
            }
            summary
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Analyzer
// ═══════════════════════════════════════════════════════════════════════════

/// Runs the exploded graph walker with the configured checks
///
/// Thread-safe: Yes (Send + Sync)
#[derive(Debug, Clone)]
pub struct SymbolicExecutionAnalyzer {
    config: SymexConfig,
    registry: CheckRegistry,
}

impl SymbolicExecutionAnalyzer {
    /// Validate `config` and register the checks it enables
    pub fn new(config: SymexConfig) -> Result<Self> {
        config.validate()?;
        let registry = CheckRegistry::from_toggles(&config.checks);
        debug!(
            checks = registry.kinds().len(),
            max_explored_states = config.max_explored_states,
            "Symbolic execution analyzer ready"
        );
        Ok(Self { config, registry })
    }

    /// Builder: Replace the registry derived from the configuration toggles
    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &SymexConfig {
        &self.config
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Walk one method body
    pub fn analyze_method(&self, method: &MethodBody) -> MethodReport {
        let outcome = ExplodedGraphWalker::new(method, self.config.clone())
            .with_registry(&self.registry)
            .walk();
        MethodReport {
            method: method.name.clone(),
            outcome,
        }
    }

    /// Load a method body from JSON, then walk it
    pub fn analyze_json(&self, json: &str) -> Result<MethodReport> {
        let method = MethodBody::from_json(json)?;
        Ok(self.analyze_method(&method))
    }

    /// Walk every method body; reports keep the input order
    pub fn analyze_all(&self, methods: &[MethodBody]) -> Vec<MethodReport> {
        #[cfg(feature = "parallel")]
        let reports: Vec<MethodReport> = methods.par_iter().map(|m| self.analyze_method(m)).collect();

        #[cfg(not(feature = "parallel"))]
        let reports: Vec<MethodReport> = methods.iter().map(|m| self.analyze_method(m)).collect();

        let summary = AnalysisSummary::from_reports(&reports);
        info!(
            methods = summary.methods,
            completed = summary.completed,
            incomplete = summary.incomplete,
            diagnostics = summary.diagnostics,
            faulted = summary.faulted,
            "Symbolic execution finished"
        );
        reports
    }
}
