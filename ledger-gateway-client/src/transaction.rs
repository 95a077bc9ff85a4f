//! Endorsed transactions and submission to the ordering service.

use crate::{
    client::GatewayClient,
    commit::UnsignedCommit,
    error::{GatewayClientError, Result},
    transport::CallOptions,
};
use ledger_gateway::protos::{
    common::{ChannelHeader, Envelope, Payload},
    gateway::{CommitStatusRequest, PreparedTransaction, SubmitRequest},
    peer::{
        ChaincodeAction, ChaincodeActionPayload, ProposalResponsePayload,
        Transaction as TransactionProto,
    },
};
use prost::Message;
use tracing::debug;

/// An endorsed transaction awaiting the signature that authorizes its
/// submission for ordering.
#[derive(Debug)]
pub struct UnsignedTransaction {
    client: GatewayClient,
    prepared_transaction: PreparedTransaction,
}

impl UnsignedTransaction {
    pub(crate) fn new(client: GatewayClient, prepared_transaction: PreparedTransaction) -> Self {
        Self {
            client,
            prepared_transaction,
        }
    }

    /// Rebuilds a transaction from [`Self::bytes`] output.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
        let prepared_transaction = PreparedTransaction::decode(bytes)?;
        if prepared_transaction.envelope.is_none() {
            return Err(GatewayClientError::MissingField("envelope"));
        }
        Ok(Self {
            client: client.clone(),
            prepared_transaction,
        })
    }

    pub fn transaction_id(&self) -> &str {
        &self.prepared_transaction.transaction_id
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.prepared_transaction.encode_to_vec()
    }

    /// The value a signer must sign: the identity's digest of the envelope
    /// payload.
    pub fn digest(&self) -> Vec<u8> {
        self.client
            .signing_identity()
            .hash(envelope_payload(&self.prepared_transaction))
    }

    /// The chaincode response payload captured during endorsement, available
    /// before the transaction is submitted or committed.
    pub fn result(&self) -> Result<Vec<u8>> {
        endorsed_result(&self.prepared_transaction)
    }

    pub async fn sign(self) -> Result<SignedTransaction> {
        let digest = self.digest();
        let signature = self.client.signing_identity().sign(&digest).await?;
        Ok(self.into_signed(&signature))
    }

    /// Applies an externally produced signature over [`Self::digest`].
    pub fn into_signed(mut self, signature: &[u8]) -> SignedTransaction {
        if let Some(envelope) = self.prepared_transaction.envelope.as_mut() {
            envelope.signature = signature.to_vec();
        }
        SignedTransaction {
            client: self.client,
            prepared_transaction: self.prepared_transaction,
        }
    }
}

/// A signed transaction, ready to submit for ordering.
#[derive(Debug)]
pub struct SignedTransaction {
    client: GatewayClient,
    prepared_transaction: PreparedTransaction,
}

impl SignedTransaction {
    /// Rebuilds a signed transaction from unsigned transaction bytes and a
    /// detached signature.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8], signature: &[u8]) -> Result<Self> {
        Ok(UnsignedTransaction::from_bytes(client, bytes)?.into_signed(signature))
    }

    pub fn transaction_id(&self) -> &str {
        &self.prepared_transaction.transaction_id
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.prepared_transaction.encode_to_vec()
    }

    pub fn signature(&self) -> &[u8] {
        self.prepared_transaction
            .envelope
            .as_ref()
            .map(|envelope| envelope.signature.as_slice())
            .unwrap_or_default()
    }

    pub fn result(&self) -> Result<Vec<u8>> {
        endorsed_result(&self.prepared_transaction)
    }

    /// Submits the transaction for ordering. Acceptance by the orderer is
    /// not a commit; follow with the returned commit handle to learn the
    /// final validation outcome.
    pub async fn submit(&self, options: CallOptions) -> Result<SubmittedTransaction> {
        let result = self.result()?;
        let channel_header = payload_channel_header(&self.prepared_transaction)?;
        let transaction_id = self.prepared_transaction.transaction_id.clone();

        let request = SubmitRequest {
            transaction_id: transaction_id.clone(),
            channel_id: channel_header.channel_id.clone(),
            prepared_transaction: self.prepared_transaction.envelope.clone(),
        };

        debug!(transaction_id = %transaction_id, "submitting transaction");
        let _response = self
            .client
            .service()
            .submit(request, options)
            .await
            .map_err(|status| GatewayClientError::submit_failed(self.transaction_id(), status))?;

        let status_request = CommitStatusRequest {
            transaction_id,
            channel_id: channel_header.channel_id,
            identity: self.client.signing_identity().creator().to_vec(),
        };
        Ok(SubmittedTransaction {
            result,
            commit: UnsignedCommit::new(self.client.clone(), &status_request),
        })
    }
}

/// A transaction accepted by the orderer: the endorsement-time result plus
/// the commit handle used to learn the final validation outcome.
#[derive(Debug)]
pub struct SubmittedTransaction {
    result: Vec<u8>,
    commit: UnsignedCommit,
}

impl SubmittedTransaction {
    /// The chaincode response payload from endorsement. Not final until the
    /// transaction commits successfully.
    pub fn result(&self) -> &[u8] {
        &self.result
    }

    pub fn transaction_id(&self) -> &str {
        self.commit.transaction_id()
    }

    pub fn into_commit(self) -> UnsignedCommit {
        self.commit
    }
}

fn envelope_payload(prepared_transaction: &PreparedTransaction) -> &[u8] {
    prepared_transaction
        .envelope
        .as_ref()
        .map(|envelope| envelope.payload.as_slice())
        .unwrap_or_default()
}

/// Decodes the channel header from an endorsed envelope's payload.
pub(crate) fn envelope_channel_header(envelope: &Envelope) -> Result<ChannelHeader> {
    let payload = Payload::decode(envelope.payload.as_slice())?;
    let header = payload
        .header
        .ok_or(GatewayClientError::MissingField("header"))?;
    Ok(ChannelHeader::decode(header.channel_header.as_slice())?)
}

fn payload_channel_header(prepared_transaction: &PreparedTransaction) -> Result<ChannelHeader> {
    let envelope = prepared_transaction
        .envelope
        .as_ref()
        .ok_or(GatewayClientError::MissingField("envelope"))?;
    envelope_channel_header(envelope)
}

/// Walks the nested endorsement structure down to the chaincode response
/// payload. Each absent layer is reported by name.
fn endorsed_result(prepared_transaction: &PreparedTransaction) -> Result<Vec<u8>> {
    let payload = Payload::decode(envelope_payload(prepared_transaction))?;
    let transaction = TransactionProto::decode(payload.data.as_slice())?;
    let action = transaction
        .actions
        .first()
        .ok_or(GatewayClientError::MissingField("actions"))?;
    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())?;
    let endorsed_action = action_payload
        .action
        .ok_or(GatewayClientError::MissingField("action"))?;
    let response_payload =
        ProposalResponsePayload::decode(endorsed_action.proposal_response_payload.as_slice())?;
    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())?;
    let response = chaincode_action
        .response
        .ok_or(GatewayClientError::MissingField("response"))?;
    Ok(response.payload)
}
