//! Commit status retrieval for submitted transactions.
//!
//! A failed commit is a successfully retrieved piece of data: the
//! [`CommitStatus`] carries the validation code whatever its value, and only
//! the explicit [`CommitStatus::as_result`] conversion turns a non-valid
//! code into an error.

use crate::{
    client::GatewayClient,
    error::{CommitFailedError, GatewayClientError, Result},
    transport::CallOptions,
};
use ledger_gateway::protos::{
    gateway::{CommitStatusRequest, SignedCommitStatusRequest},
    peer::TxValidationCode,
};
use prost::Message;
use tracing::debug;

/// A commit status request awaiting its signature.
#[derive(Debug)]
pub struct UnsignedCommit {
    client: GatewayClient,
    signed_request: SignedCommitStatusRequest,
    transaction_id: String,
}

impl UnsignedCommit {
    pub(crate) fn new(client: GatewayClient, request: &CommitStatusRequest) -> Self {
        Self {
            client,
            signed_request: SignedCommitStatusRequest {
                request: request.encode_to_vec(),
                signature: Vec::new(),
            },
            transaction_id: request.transaction_id.clone(),
        }
    }

    /// Rebuilds a commit request from [`Self::bytes`] output.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
        let signed_request = SignedCommitStatusRequest::decode(bytes)?;
        let request = CommitStatusRequest::decode(signed_request.request.as_slice())?;
        Ok(Self {
            client: client.clone(),
            signed_request,
            transaction_id: request.transaction_id,
        })
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.signed_request.encode_to_vec()
    }

    /// The value a signer must sign: the identity's digest of the serialized
    /// status request.
    pub fn digest(&self) -> Vec<u8> {
        self.client
            .signing_identity()
            .hash(&self.signed_request.request)
    }

    pub async fn sign(self) -> Result<SignedCommit> {
        let digest = self.digest();
        let signature = self.client.signing_identity().sign(&digest).await?;
        Ok(self.into_signed(&signature))
    }

    /// Applies an externally produced signature over [`Self::digest`].
    pub fn into_signed(mut self, signature: &[u8]) -> SignedCommit {
        self.signed_request.signature = signature.to_vec();
        SignedCommit {
            client: self.client,
            signed_request: self.signed_request,
            transaction_id: self.transaction_id,
        }
    }
}

/// A signed commit status request, ready to query the gateway.
#[derive(Debug)]
pub struct SignedCommit {
    client: GatewayClient,
    signed_request: SignedCommitStatusRequest,
    transaction_id: String,
}

impl SignedCommit {
    /// Rebuilds a signed commit request from unsigned bytes and a detached
    /// signature.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8], signature: &[u8]) -> Result<Self> {
        Ok(UnsignedCommit::from_bytes(client, bytes)?.into_signed(signature))
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.signed_request.encode_to_vec()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signed_request.signature
    }

    /// Blocks until the transaction commits (or fails to) and returns the
    /// outcome. The call itself fails only on transport or protocol errors.
    pub async fn status(&self, options: CallOptions) -> Result<CommitStatus> {
        debug!(transaction_id = %self.transaction_id, "querying commit status");
        let response = self
            .client
            .service()
            .commit_status(self.signed_request.clone(), options)
            .await
            .map_err(|status| {
                GatewayClientError::commit_status_failed(&self.transaction_id, status)
            })?;

        Ok(CommitStatus {
            transaction_id: self.transaction_id.clone(),
            block_number: response.block_number,
            code: response.result,
        })
    }
}

/// The final validation outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub transaction_id: String,
    /// Number of the block that recorded the transaction.
    pub block_number: u64,
    code: i32,
}

impl CommitStatus {
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The validation code as a known enum value, if it is one.
    pub fn validation_code(&self) -> Option<TxValidationCode> {
        TxValidationCode::from_i32(self.code)
    }

    pub fn successful(&self) -> bool {
        self.code == TxValidationCode::Valid as i32
    }

    /// Converts a non-valid status into an error. This is the only place a
    /// failed commit becomes an error rather than data.
    pub fn as_result(&self) -> std::result::Result<(), CommitFailedError> {
        if self.successful() {
            return Ok(());
        }
        let code_name = match self.validation_code() {
            Some(code) => format!("{code:?}"),
            None => "Unknown".to_string(),
        };
        Err(CommitFailedError {
            transaction_id: self.transaction_id.clone(),
            code: self.code,
            code_name,
        })
    }
}
