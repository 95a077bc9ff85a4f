//! Error taxonomy for gateway client operations.
//!
//! Transport failures are wrapped in a phase-specific variant carrying the
//! transaction ID, the gRPC status code, and the per-organization detail
//! records decoded from the status trailer. Nothing here is retried or
//! swallowed; every error surfaces to the direct caller.

use ledger_gateway::{
    crypto::CryptoError,
    protos::{gateway::ErrorDetail, rpc},
};
use prost::Message;
use std::fmt;
use thiserror::Error;
use tonic::{Code, Status};

pub type Result<T> = std::result::Result<T, GatewayClientError>;

#[derive(Debug, Error)]
pub enum GatewayClientError {
    /// Failure reported by the gateway while endorsing a proposal.
    #[error(transparent)]
    Endorse(TransactionError),
    /// Failure reported while submitting an endorsed transaction to ordering.
    #[error(transparent)]
    Submit(TransactionError),
    /// Failure reported while retrieving a commit status.
    #[error(transparent)]
    CommitStatus(TransactionError),
    /// Failure on a gateway call with no submitted transaction (evaluate,
    /// event subscription setup, event delivery).
    #[error(transparent)]
    Gateway(TransactionError),

    /// Explicit conversion of a non-valid commit status. Never produced by
    /// status retrieval itself; see [`crate::commit::CommitStatus::as_result`].
    #[error(transparent)]
    CommitFailed(#[from] CommitFailedError),

    /// A response arrived without a field the protocol requires. Indicates a
    /// gateway compatibility problem, not a transient fault.
    #[error("missing required field in response: {0}")]
    MissingField(&'static str),

    /// The transaction ID inside a message header does not match the ID the
    /// enclosing request claims.
    #[error("transaction ID mismatch: header {header:?}, request {request:?}")]
    TransactionIdMismatch { header: String, request: String },

    /// A delivery stream ended with an explicit status message.
    #[error("event stream ended with status {status}")]
    StreamStatus { status: i32 },

    /// A delivery stream produced a message variant this subscription does
    /// not understand.
    #[error("unexpected message variant on event stream: {0}")]
    UnexpectedStreamMessage(&'static str),

    /// A persisted checkpoint could not be interpreted.
    #[error("invalid checkpoint state: {0}")]
    InvalidCheckpoint(String),

    // Wrapped errors
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Decode(#[from] prost::DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl GatewayClientError {
    pub(crate) fn endorse_failed(transaction_id: &str, status: Status) -> Self {
        Self::Endorse(TransactionError::new(Some(transaction_id.into()), status))
    }

    pub(crate) fn submit_failed(transaction_id: &str, status: Status) -> Self {
        Self::Submit(TransactionError::new(Some(transaction_id.into()), status))
    }

    pub(crate) fn commit_status_failed(transaction_id: &str, status: Status) -> Self {
        Self::CommitStatus(TransactionError::new(Some(transaction_id.into()), status))
    }

    pub(crate) fn gateway_failed(transaction_id: Option<&str>, status: Status) -> Self {
        Self::Gateway(TransactionError::new(
            transaction_id.map(Into::into),
            status,
        ))
    }
}

/// Transport failure detail shared by the per-phase error variants.
#[derive(Debug)]
pub struct TransactionError {
    pub transaction_id: Option<String>,
    pub code: Code,
    /// One record per endorsing peer that reported a failure, decoded from
    /// the gRPC status-details trailer.
    pub details: Vec<ErrorDetail>,
    source: Status,
}

impl TransactionError {
    pub(crate) fn new(transaction_id: Option<String>, status: Status) -> Self {
        let details = decode_error_details(&status);
        Self {
            transaction_id,
            code: status.code(),
            details,
            source: status,
        }
    }

    /// The gRPC status that caused this error.
    pub fn status(&self) -> &Status {
        &self.source
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transaction_id {
            Some(transaction_id) => write!(
                f,
                "gateway call failed for transaction {transaction_id}: {:?}: {}",
                self.code,
                self.source.message()
            ),
            None => write!(
                f,
                "gateway call failed: {:?}: {}",
                self.code,
                self.source.message()
            ),
        }
    }
}

impl std::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Result of explicitly converting a non-valid [`crate::commit::CommitStatus`]
/// into an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction {transaction_id} failed to commit with status {code} ({code_name})")]
pub struct CommitFailedError {
    pub transaction_id: String,
    pub code: i32,
    pub code_name: String,
}

fn decode_error_details(status: &Status) -> Vec<ErrorDetail> {
    let Ok(rpc_status) = rpc::Status::decode(status.details()) else {
        return Vec::new();
    };
    rpc_status
        .details
        .iter()
        .filter(|any| any.type_url.ends_with("ErrorDetail"))
        .filter_map(|any| ErrorDetail::decode(any.value.as_slice()).ok())
        .collect()
}
