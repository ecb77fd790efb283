//! Check registry
//!
//! Maps configuration toggles to fresh check instances. Every walk gets its
//! own instances: checks hold walk-local state and are never shared.

use super::infrastructure::{
    ConstantConditionCheck, NullPointerDereferenceCheck, ObjectDisposedCheck, UncheckedArgumentCheck,
    CONDITION_ALWAYS_SAME_DEAD_CODE_RULE, CONDITION_ALWAYS_SAME_RULE, NULL_POINTER_DEREFERENCE_RULE,
    OBJECT_DISPOSED_RULE, UNCHECKED_ARGUMENT_RULE,
};
use super::ports::Check;
use crate::config::CheckToggles;
use serde::{Deserialize, Serialize};

/// Built-in check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckKind {
    NullPointerDereference,
    ObjectDisposed,
    UncheckedArgument,
    ConstantCondition,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::NullPointerDereference,
        CheckKind::ObjectDisposed,
        CheckKind::UncheckedArgument,
        CheckKind::ConstantCondition,
    ];

    /// Rules this check can report
    pub fn rule_ids(&self) -> &'static [&'static str] {
        match self {
            CheckKind::NullPointerDereference => &[NULL_POINTER_DEREFERENCE_RULE],
            CheckKind::ObjectDisposed => &[OBJECT_DISPOSED_RULE],
            CheckKind::UncheckedArgument => &[UNCHECKED_ARGUMENT_RULE],
            CheckKind::ConstantCondition => {
                &[CONDITION_ALWAYS_SAME_DEAD_CODE_RULE, CONDITION_ALWAYS_SAME_RULE]
            }
        }
    }

    pub fn create(&self) -> Box<dyn Check> {
        match self {
            CheckKind::NullPointerDereference => Box::new(NullPointerDereferenceCheck::new()),
            CheckKind::ObjectDisposed => Box::new(ObjectDisposedCheck::new()),
            CheckKind::UncheckedArgument => Box::new(UncheckedArgumentCheck::new()),
            CheckKind::ConstantCondition => Box::new(ConstantConditionCheck::new()),
        }
    }

    fn enabled_in(&self, toggles: &CheckToggles) -> bool {
        match self {
            CheckKind::NullPointerDereference => toggles.null_pointer_dereference,
            CheckKind::ObjectDisposed => toggles.object_disposed,
            CheckKind::UncheckedArgument => toggles.unchecked_argument,
            CheckKind::ConstantCondition => toggles.constant_condition,
        }
    }
}

/// Ordered set of checks to register with each walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRegistry {
    kinds: Vec<CheckKind>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toggles(toggles: &CheckToggles) -> Self {
        Self {
            kinds: CheckKind::ALL
                .iter()
                .copied()
                .filter(|k| k.enabled_in(toggles))
                .collect(),
        }
    }

    /// Builder: Add a check (ignored if already present)
    pub fn with(mut self, kind: CheckKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn kinds(&self) -> &[CheckKind] {
        &self.kinds
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Fresh check instances in registration order.
    ///
    /// The unchecked-argument check consumes the null-dereference check's
    /// messages; when only the consumer is enabled, a silent producer is
    /// registered ahead of it.
    pub fn instantiate(&self) -> Vec<Box<dyn Check>> {
        let mut checks: Vec<Box<dyn Check>> = Vec::with_capacity(self.kinds.len() + 1);
        let needs_silent_producer = self.kinds.contains(&CheckKind::UncheckedArgument)
            && !self.kinds.contains(&CheckKind::NullPointerDereference);
        if needs_silent_producer {
            checks.push(Box::new(NullPointerDereferenceCheck::silent()));
        }
        checks.extend(self.kinds.iter().map(|k| k.create()));
        checks
    }
}
