//! Walk-scoped message log shared by checks
//!
//! Producers append, consumers read from their own cursor. Nothing is ever
//! removed during a walk, so the order in which checks read does not matter
//! and no check needs to know who is listening.

use crate::features::program_state::{ProgramPoint, SymbolicValue};
use crate::shared::models::Span;

/// Message one check posts for others
#[derive(Debug, Clone, PartialEq)]
pub enum CheckMessage {
    /// A member of `value` was accessed while its nullness was still unknown
    MemberAccessedUnresolved {
        value: SymbolicValue,
        point: ProgramPoint,
        span: Option<Span>,
    },
}

/// Append-only message log
#[derive(Debug, Default)]
pub struct Inbox {
    messages: Vec<CheckMessage>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, message: CheckMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn all(&self) -> &[CheckMessage] {
        &self.messages
    }
}

/// Read position of one consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboxCursor {
    position: usize,
}

impl InboxCursor {
    /// Messages posted since the previous read
    pub fn read<'a>(&mut self, inbox: &'a Inbox) -> &'a [CheckMessage] {
        let start = self.position.min(inbox.messages.len());
        self.position = inbox.messages.len();
        &inbox.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(offset: usize) -> CheckMessage {
        CheckMessage::MemberAccessedUnresolved {
            value: SymbolicValue::this(),
            point: ProgramPoint::new(0, offset),
            span: None,
        }
    }

    #[test]
    fn test_cursors_are_independent() {
        let mut inbox = Inbox::new();
        let mut first = InboxCursor::default();
        let mut second = InboxCursor::default();

        inbox.post(message(0));
        assert_eq!(first.read(&inbox).len(), 1);
        assert!(first.read(&inbox).is_empty());

        inbox.post(message(1));
        assert_eq!(first.read(&inbox), &[message(1)]);
        assert_eq!(second.read(&inbox).len(), 2);
        assert_eq!(inbox.len(), 2);
    }
}
