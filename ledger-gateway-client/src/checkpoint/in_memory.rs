use super::{Checkpoint, Checkpointer, Position};
use crate::error::Result;
use std::collections::HashSet;

/// A checkpointer that lives only as long as the process. Suitable for
/// consumers that rebuild their state on restart anyway.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointer {
    position: Position,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpoint for InMemoryCheckpointer {
    fn block_number(&self) -> Option<u64> {
        self.position.block_number()
    }

    fn transaction_ids(&self) -> HashSet<String> {
        self.position.transaction_ids().clone()
    }
}

impl Checkpointer for InMemoryCheckpointer {
    fn checkpoint(&mut self, block_number: u64, transaction_id: Option<&str>) -> Result<()> {
        self.position.record(block_number, transaction_id);
        Ok(())
    }
}
