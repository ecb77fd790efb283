//! Domain layer of the checks feature

pub mod diagnostic;
pub mod inbox;

pub use diagnostic::Diagnostic;
pub use inbox::{CheckMessage, Inbox, InboxCursor};
