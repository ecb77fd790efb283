// Checks: pluggable visitors of a walk
//
// Hexagonal Architecture:
// - domain: diagnostics, walk-scoped message inbox
// - ports: Check trait, CheckContext, CheckError
// - infrastructure: built-in checks
// - application: registry mapping configuration to check instances

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{CheckKind, CheckRegistry};
pub use domain::{CheckMessage, Diagnostic, Inbox, InboxCursor};
pub use infrastructure::{
    ConstantConditionCheck, NullPointerDereferenceCheck, ObjectDisposedCheck, UncheckedArgumentCheck,
};
pub use ports::{Branch, BranchOutcome, Check, CheckContext, CheckError, CheckResult};
