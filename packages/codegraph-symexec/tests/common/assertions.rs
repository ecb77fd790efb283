//! Custom assertions for walk outcomes

use codegraph_symexec::features::exploded_graph::ExplorationOutcome;

/// Rule ids of the outcome's diagnostics, in report order
pub fn rule_ids(outcome: &ExplorationOutcome) -> Vec<&str> {
    outcome.diagnostics.iter().map(|d| d.rule_id.as_str()).collect()
}

/// Assert that the walk completed without any diagnostic
pub fn assert_clean(outcome: &ExplorationOutcome) {
    assert!(outcome.is_complete(), "Expected a complete walk, got {:?}", outcome.status);
    assert!(
        outcome.diagnostics.is_empty(),
        "Expected no diagnostics, got: {:?}",
        outcome.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>()
    );
    assert!(
        outcome.faulted_checks.is_empty(),
        "Expected no faulted checks, got: {:?}",
        outcome.faulted_checks
    );
}

/// Assert that the walk completed with exactly these rule ids, in order
pub fn assert_rules(outcome: &ExplorationOutcome, expected: &[&str]) {
    assert!(outcome.is_complete(), "Expected a complete walk, got {:?}", outcome.status);
    assert_eq!(
        rule_ids(outcome),
        expected,
        "Diagnostics: {:?}",
        outcome.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>()
    );
}
