use crate::shared::models::BlockId;
use serde::{Deserialize, Serialize};

/// Position of execution inside the CFG.
///
/// `offset` indexes the block's instructions; `offset == instructions.len()`
/// addresses the block terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramPoint {
    pub block: BlockId,
    pub offset: usize,
}

impl ProgramPoint {
    pub fn new(block: BlockId, offset: usize) -> Self {
        Self { block, offset }
    }

    /// First point of a block
    pub fn entry_of(block: BlockId) -> Self {
        Self::new(block, 0)
    }

    pub fn next(&self) -> Self {
        Self::new(self.block, self.offset + 1)
    }

    pub fn is_block_entry(&self) -> bool {
        self.offset == 0
    }
}

impl std::fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}:{}", self.block, self.offset)
    }
}
