//! Control Flow Graph types
//!
//! One method body as ordered basic blocks. Each block owns its
//! instructions, a terminator and its annotated successor edges. The graph is
//! produced by the front end and treated as read-only by the engine.

use super::instruction::Instruction;
use super::span::Span;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, Dfs, DfsEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a block inside its [`ControlFlowGraph`]
pub type BlockId = usize;

/// CFG edge kind (control flow edge types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CfgEdgeKind {
    /// Sequential execution (fall-through / goto)
    Unconditional,
    /// True branch of a [`Terminator::Conditional`]
    TrueBranch,
    /// False branch of a [`Terminator::Conditional`]
    FalseBranch,
    /// Operand is null ([`Terminator::NullCheck`], `?.` / `??`)
    NullBranch,
    /// Operand is not null ([`Terminator::NullCheck`])
    NotNullBranch,
    /// Loop back edge
    LoopBack,
    /// Exception handler edge (catch / finally)
    Exception,
}

impl CfgEdgeKind {
    /// Edges followed by [`Terminator::Jump`]
    pub fn is_unconditional(&self) -> bool {
        matches!(self, CfgEdgeKind::Unconditional | CfgEdgeKind::LoopBack)
    }
}

/// Outgoing edge of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgEdge {
    pub target: BlockId,
    pub kind: CfgEdgeKind,
}

/// How control leaves a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    /// Follow every unconditional / loop-back edge
    Jump,
    /// Pop a boolean and branch on it
    Conditional,
    /// Branch on the nullness of the top of the stack (operand stays on the stack)
    NullCheck,
    /// Leave the method, optionally popping the returned value
    Return { has_value: bool },
    /// Pop the exception object; flow continues only along exception edges
    Throw,
    /// Exit block of the method
    Exit,
}

impl Terminator {
    pub fn ends_method(&self) -> bool {
        matches!(self, Terminator::Return { .. } | Terminator::Exit)
    }
}

/// CFG basic block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Position of the block in [`ControlFlowGraph::blocks`]
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
    #[serde(default)]
    pub successors: Vec<CfgEdge>,
    /// Span of the branch condition / return statement, when any
    #[serde(default)]
    pub span: Option<Span>,
}

impl BasicBlock {
    pub fn successors_of_kind(&self, kind: CfgEdgeKind) -> impl Iterator<Item = BlockId> + '_ {
        self.successors
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.target)
    }

    pub fn exception_successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors_of_kind(CfgEdgeKind::Exception)
    }

    pub fn has_exception_handlers(&self) -> bool {
        self.successors.iter().any(|e| e.kind == CfgEdgeKind::Exception)
    }

    /// Offset of the terminator program point
    pub fn terminator_offset(&self) -> usize {
        self.instructions.len()
    }
}

/// Structural problems in a front-end CFG
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    #[error("entry block {0} does not exist")]
    MissingEntry(BlockId),

    #[error("block at index {index} declares id {id}")]
    BlockIdMismatch { index: usize, id: BlockId },

    #[error("edge {from} -> {target} points to a missing block")]
    DanglingEdge { from: BlockId, target: BlockId },

    #[error("block {block} has a {terminator} terminator but no {kind:?} edge")]
    MissingBranch {
        block: BlockId,
        terminator: &'static str,
        kind: CfgEdgeKind,
    },

    #[error("block {block} ends the method but has a {kind:?} successor")]
    UnexpectedSuccessor { block: BlockId, kind: CfgEdgeKind },
}

/// Result of [`ControlFlowGraph::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgReport {
    /// Blocks not reachable from the entry (never explored)
    pub unreachable: Vec<BlockId>,
    /// Whether the graph contains a cycle
    pub has_loops: bool,
    /// Targets of back edges, see [`ControlFlowGraph::loop_heads`]
    pub loop_heads: Vec<BlockId>,
}

/// Control-flow graph of one method body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub entry: BlockId,
    pub blocks: Vec<BasicBlock>,
}

impl ControlFlowGraph {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All edges as `(source, edge)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (BlockId, &CfgEdge)> {
        self.blocks
            .iter()
            .flat_map(|b| b.successors.iter().map(move |e| (b.id, e)))
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Check structural consistency and compute reachability
    pub fn validate(&self) -> Result<CfgReport, CfgError> {
        if self.entry >= self.blocks.len() {
            return Err(CfgError::MissingEntry(self.entry));
        }

        for (index, block) in self.blocks.iter().enumerate() {
            if block.id != index {
                return Err(CfgError::BlockIdMismatch {
                    index,
                    id: block.id,
                });
            }
            for edge in &block.successors {
                if edge.target >= self.blocks.len() {
                    return Err(CfgError::DanglingEdge {
                        from: block.id,
                        target: edge.target,
                    });
                }
            }
            Self::validate_terminator(block)?;
        }

        let (graph, nodes) = self.to_graph();

        let mut reachable = vec![false; self.blocks.len()];
        let mut dfs = Dfs::new(&graph, nodes[self.entry]);
        while let Some(node) = dfs.next(&graph) {
            reachable[graph[node]] = true;
        }

        let unreachable: Vec<BlockId> = reachable
            .iter()
            .enumerate()
            .filter(|(_, r)| !**r)
            .map(|(id, _)| id)
            .collect();
        if !unreachable.is_empty() {
            tracing::debug!(blocks = ?unreachable, "CFG contains unreachable blocks");
        }

        Ok(CfgReport {
            unreachable,
            has_loops: petgraph::algo::is_cyclic_directed(&graph),
            loop_heads: self.loop_heads(),
        })
    }

    fn to_graph(&self) -> (DiGraph<BlockId, CfgEdgeKind>, Vec<NodeIndex>) {
        let mut graph: DiGraph<BlockId, CfgEdgeKind> = DiGraph::with_capacity(self.blocks.len(), 0);
        let nodes: Vec<NodeIndex> = self.blocks.iter().map(|b| graph.add_node(b.id)).collect();
        for (source, edge) in self.edges() {
            if let (Some(from), Some(to)) = (nodes.get(source), nodes.get(edge.target)) {
                graph.add_edge(*from, *to, edge.kind);
            }
        }
        (graph, nodes)
    }

    /// Blocks entered through a back edge: targets of `LoopBack` edges plus
    /// targets of back edges found by a depth-first search from the entry.
    /// Every cycle reachable from the entry contains at least one of them.
    pub fn loop_heads(&self) -> Vec<BlockId> {
        let mut heads: Vec<BlockId> = self
            .edges()
            .filter(|(_, e)| e.kind == CfgEdgeKind::LoopBack)
            .map(|(_, e)| e.target)
            .collect();

        let (graph, nodes) = self.to_graph();
        if let Some(start) = nodes.get(self.entry) {
            depth_first_search(&graph, Some(*start), |event| {
                if let DfsEvent::BackEdge(_, head) = event {
                    heads.push(graph[head]);
                }
            });
        }

        heads.sort_unstable();
        heads.dedup();
        heads
    }

    /// Blocks lying on a cycle (non-trivial strongly connected component or self-loop)
    pub fn cyclic_blocks(&self) -> Vec<BlockId> {
        let (graph, _) = self.to_graph();
        let mut blocks: Vec<BlockId> = petgraph::algo::tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().map_or(false, |n| graph.contains_edge(*n, *n))
            })
            .flatten()
            .map(|n| graph[n])
            .collect();
        blocks.sort_unstable();
        blocks
    }

    fn validate_terminator(block: &BasicBlock) -> Result<(), CfgError> {
        let require = |terminator: &'static str, kind: CfgEdgeKind| {
            if block.successors.iter().any(|e| e.kind == kind) {
                Ok(())
            } else {
                Err(CfgError::MissingBranch {
                    block: block.id,
                    terminator,
                    kind,
                })
            }
        };

        match block.terminator {
            Terminator::Jump => {
                if !block.successors.iter().any(|e| e.kind.is_unconditional()) {
                    return Err(CfgError::MissingBranch {
                        block: block.id,
                        terminator: "jump",
                        kind: CfgEdgeKind::Unconditional,
                    });
                }
            }
            Terminator::Conditional => {
                require("conditional", CfgEdgeKind::TrueBranch)?;
                require("conditional", CfgEdgeKind::FalseBranch)?;
            }
            Terminator::NullCheck => {
                require("null-check", CfgEdgeKind::NullBranch)?;
                require("null-check", CfgEdgeKind::NotNullBranch)?;
            }
            Terminator::Return { .. } | Terminator::Throw | Terminator::Exit => {
                if let Some(edge) = block.successors.iter().find(|e| e.kind != CfgEdgeKind::Exception) {
                    return Err(CfgError::UnexpectedSuccessor {
                        block: block.id,
                        kind: edge.kind,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Fluent CFG construction for front ends and tests
#[derive(Debug, Default)]
pub struct CfgBuilder {
    entry: BlockId,
    blocks: Vec<BasicBlock>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block and return its id
    pub fn block(&mut self, instructions: Vec<Instruction>, terminator: Terminator) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(BasicBlock {
            id,
            instructions,
            terminator,
            successors: Vec::new(),
            span: None,
        });
        id
    }

    pub fn edge(&mut self, source: BlockId, target: BlockId, kind: CfgEdgeKind) -> &mut Self {
        if let Some(block) = self.blocks.get_mut(source) {
            block.successors.push(CfgEdge { target, kind });
        }
        self
    }

    pub fn jump(&mut self, source: BlockId, target: BlockId) -> &mut Self {
        self.edge(source, target, CfgEdgeKind::Unconditional)
    }

    /// Wire both branches of a conditional block
    pub fn branch(&mut self, source: BlockId, when_true: BlockId, when_false: BlockId) -> &mut Self {
        self.edge(source, when_true, CfgEdgeKind::TrueBranch)
            .edge(source, when_false, CfgEdgeKind::FalseBranch)
    }

    pub fn span(&mut self, block: BlockId, span: Span) -> &mut Self {
        if let Some(b) = self.blocks.get_mut(block) {
            b.span = Some(span);
        }
        self
    }

    pub fn entry(&mut self, entry: BlockId) -> &mut Self {
        self.entry = entry;
        self
    }

    /// Validate and return the graph
    pub fn build(self) -> Result<ControlFlowGraph, CfgError> {
        let cfg = ControlFlowGraph {
            entry: self.entry,
            blocks: self.blocks,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
