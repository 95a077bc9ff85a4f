//! Resume cursors for event subscriptions.
//!
//! A checkpointer records how far an event consumer has processed so a
//! restarted subscription resumes exactly where it left off: at the block
//! after a fully processed block, or within a partially processed block with
//! the already-seen transactions skipped.

mod file;
mod in_memory;

pub use file::FileCheckpointer;
pub use in_memory::InMemoryCheckpointer;

use crate::error::Result;
use std::collections::HashSet;

/// Read view of a recorded position. Builders consult this when a
/// subscription is created.
pub trait Checkpoint {
    /// Block at which a resumed subscription should start. `None` means no
    /// position has been recorded; block zero is a real position.
    fn block_number(&self) -> Option<u64>;

    /// Transactions already processed within [`Self::block_number`]. Empty
    /// when the whole block was processed.
    fn transaction_ids(&self) -> HashSet<String>;
}

/// A [`Checkpoint`] that can record progress.
pub trait Checkpointer: Checkpoint {
    /// Records progress. With no transaction ID the whole block is done and
    /// replay resumes after it. With one, replay resumes at this block and
    /// skips every transaction recorded for it so far.
    fn checkpoint(&mut self, block_number: u64, transaction_id: Option<&str>) -> Result<()>;
}

/// Shared cursor arithmetic behind both checkpointer implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Position {
    block_number: Option<u64>,
    transaction_ids: HashSet<String>,
    last_transaction_id: Option<String>,
}

impl Position {
    pub(crate) fn new(block_number: Option<u64>, last_transaction_id: Option<String>) -> Self {
        let transaction_ids = last_transaction_id.iter().cloned().collect();
        Self {
            block_number,
            transaction_ids,
            last_transaction_id,
        }
    }

    pub(crate) fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub(crate) fn transaction_ids(&self) -> &HashSet<String> {
        &self.transaction_ids
    }

    pub(crate) fn last_transaction_id(&self) -> Option<&str> {
        self.last_transaction_id.as_deref()
    }

    pub(crate) fn record(&mut self, block_number: u64, transaction_id: Option<&str>) {
        match transaction_id {
            None => {
                self.block_number = Some(block_number + 1);
                self.transaction_ids.clear();
                self.last_transaction_id = None;
            }
            Some(transaction_id) => {
                if self.block_number != Some(block_number) {
                    self.block_number = Some(block_number);
                    self.transaction_ids.clear();
                }
                let _ = self.transaction_ids.insert(transaction_id.to_string());
                self.last_transaction_id = Some(transaction_id.to_string());
            }
        }
    }
}
