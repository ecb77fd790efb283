//! Front-end input model
//!
//! Everything the engine consumes from the parser + semantic model:
//! control-flow graphs, instructions, symbols and source spans.

pub mod cfg;
pub mod instruction;
pub mod method;
pub mod span;
pub mod symbol;

pub use cfg::{BasicBlock, BlockId, CfgBuilder, CfgEdge, CfgEdgeKind, CfgError, CfgReport, ControlFlowGraph, Terminator};
pub use instruction::{ComparisonOp, Instruction, InstructionKind, LiteralValue, MethodRef, MethodSemantics};
pub use method::{MethodBody, MethodKind, Visibility};
pub use span::Span;
pub use symbol::{Nullability, Symbol, SymbolId, SymbolKind, SymbolResolver, SymbolTable};
