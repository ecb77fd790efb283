//! Common test utilities for codegraph-symexec
//!
//! CFG fixtures for the canonical null-handling scenarios, small helper
//! checks and domain-specific assertions.

#![allow(dead_code)]

mod assertions;
mod fixtures;

pub use assertions::*;
pub use fixtures::*;
