//! Diagnostics emitted by checks at walk end

use crate::features::program_state::ProgramPoint;
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};

/// One finding: where, which rule, and a message template with arguments.
///
/// Rendering is left to the reporter; [`Diagnostic::message`] fills the
/// `{0}`, `{1}`, ... placeholders for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier (e.g. "S2259")
    pub rule_id: String,

    /// Name of the check that produced it
    pub check: String,

    pub point: ProgramPoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    pub message_template: String,

    pub arguments: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        check: impl Into<String>,
        point: ProgramPoint,
        span: Option<Span>,
        message_template: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            check: check.into(),
            point,
            span,
            message_template: message_template.into(),
            arguments,
        }
    }

    /// Template with placeholders substituted
    pub fn message(&self) -> String {
        let mut message = self.message_template.clone();
        for (index, argument) in self.arguments.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), argument);
        }
        message
    }

    /// Ordering key used to make reports deterministic
    pub(crate) fn sort_key(&self) -> (ProgramPoint, &str, &[String]) {
        (self.point, self.rule_id.as_str(), self.arguments.as_slice())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) => write!(f, "[{}] {} at {}", self.rule_id, self.message(), span),
            None => write!(f, "[{}] {} at {}", self.rule_id, self.message(), self.point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_substitution() {
        let diagnostic = Diagnostic::new(
            "S2259",
            "NullPointerDereference",
            ProgramPoint::new(1, 0),
            None,
            "'{0}' is null on at least one execution path.",
            vec!["x".to_string()],
        );
        assert_eq!(diagnostic.message(), "'x' is null on at least one execution path.");
        assert_eq!(
            diagnostic.to_string(),
            "[S2259] 'x' is null on at least one execution path. at B1:0"
        );
    }

    #[test]
    fn test_display_prefers_span() {
        let diagnostic = Diagnostic::new(
            "S3966",
            "ObjectDisposed",
            ProgramPoint::new(0, 2),
            Some(Span::line(4, 9, 18)),
            "'{0}' is accessed after being disposed.",
            vec!["stream".to_string()],
        );
        assert!(diagnostic.to_string().ends_with(&Span::line(4, 9, 18).to_string()));
    }
}
