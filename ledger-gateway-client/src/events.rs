//! Event subscriptions: chaincode events and the three block event flavors.
//!
//! Every subscription request goes through the same unsigned/signed phases
//! as a transaction, and every stream handle cancels its server-side RPC
//! when closed or dropped.

mod block;
mod chaincode;

pub use block::{
    BlockAndPrivateDataEventStream, BlockAndPrivateDataEventsBuilder,
    BlockAndPrivateDataEventsRequest, BlockEventStream, BlockEventsBuilder, BlockEventsRequest,
    FilteredBlockEventStream, FilteredBlockEventsBuilder, FilteredBlockEventsRequest,
    UnsignedBlockAndPrivateDataEventsRequest, UnsignedBlockEventsRequest,
    UnsignedFilteredBlockEventsRequest,
};
pub use chaincode::{
    ChaincodeEvent, ChaincodeEventStream, ChaincodeEventsBuilder, ChaincodeEventsRequest,
    UnsignedChaincodeEventsRequest,
};

use crate::checkpoint::Checkpoint;
use ledger_gateway::protos::orderer::SeekPosition;
use std::collections::HashSet;

/// The checkpoint state captured when a builder is configured, so later
/// mutation of the checkpointer cannot affect an already-built request.
#[derive(Debug, Clone, Default)]
pub(crate) struct CheckpointSnapshot {
    pub(crate) block_number: Option<u64>,
    pub(crate) transaction_ids: HashSet<String>,
}

impl CheckpointSnapshot {
    pub(crate) fn capture(checkpoint: &dyn Checkpoint) -> Self {
        Self {
            block_number: checkpoint.block_number(),
            transaction_ids: checkpoint.transaction_ids(),
        }
    }
}

/// Resolves where a subscription starts. A checkpoint position, block zero
/// included, takes precedence over an explicitly requested start block so a
/// restarted consumer resumes where it left off; with neither, delivery
/// starts at the next committed block.
pub(crate) fn start_position(
    checkpoint_block: Option<u64>,
    start_block: Option<u64>,
) -> SeekPosition {
    match checkpoint_block.or(start_block) {
        Some(number) => SeekPosition::specified(number),
        None => SeekPosition::next_commit(),
    }
}
