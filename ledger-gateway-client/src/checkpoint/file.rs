use super::{Checkpoint, Checkpointer, Position};
use crate::error::{GatewayClientError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, io::ErrorKind, path::PathBuf};
use tracing::debug;

/// A checkpointer persisted as a small JSON file, written atomically enough
/// for a single consumer: every update rewrites the whole state.
///
/// Only the block number and the most recent transaction ID survive a
/// restart. Re-delivery of that one transaction is suppressed on resume;
/// earlier transactions in the same block are the consumer's job to
/// de-duplicate if it processed them before the crash.
#[derive(Debug)]
pub struct FileCheckpointer {
    path: PathBuf,
    position: Position,
}

impl FileCheckpointer {
    /// Opens the checkpoint file, creating it with an empty position when it
    /// does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let position = match fs::read(&path) {
            Ok(bytes) => {
                let state: PersistedState = serde_json::from_slice(&bytes)?;
                state.into_position()?
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "creating new checkpoint file");
                Position::default()
            }
            Err(error) => return Err(error.into()),
        };

        let checkpointer = Self { path, position };
        checkpointer.save()?;
        Ok(checkpointer)
    }

    fn save(&self) -> Result<()> {
        let state = PersistedState::from_position(&self.position);
        fs::write(&self.path, serde_json::to_vec(&state)?)?;
        Ok(())
    }
}

impl Checkpoint for FileCheckpointer {
    fn block_number(&self) -> Option<u64> {
        self.position.block_number()
    }

    fn transaction_ids(&self) -> HashSet<String> {
        self.position.transaction_ids().clone()
    }
}

impl Checkpointer for FileCheckpointer {
    fn checkpoint(&mut self, block_number: u64, transaction_id: Option<&str>) -> Result<()> {
        self.position.record(block_number, transaction_id);
        self.save()
    }
}

/// On-disk schema. The block number is serialized as a string so readers in
/// environments with less than 64 bits of integer precision see it exactly.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    #[serde(
        rename = "blockNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    block_number: Option<String>,
    #[serde(
        rename = "transactionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    transaction_id: Option<String>,
}

impl PersistedState {
    fn from_position(position: &Position) -> Self {
        Self {
            block_number: position.block_number().map(|number| number.to_string()),
            transaction_id: position.last_transaction_id().map(ToString::to_string),
        }
    }

    fn into_position(self) -> Result<Position> {
        let block_number = self
            .block_number
            .map(|text| {
                text.parse::<u64>().map_err(|_| {
                    GatewayClientError::InvalidCheckpoint(format!(
                        "block number is not an unsigned integer: {text:?}"
                    ))
                })
            })
            .transpose()?;
        Ok(Position::new(block_number, self.transaction_id))
    }
}
