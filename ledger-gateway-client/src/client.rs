//! Entry point binding a signing identity to a gateway transport.

use crate::{
    commit::{SignedCommit, UnsignedCommit},
    error::Result,
    events::{
        BlockAndPrivateDataEventsBuilder, BlockEventsBuilder, ChaincodeEventsBuilder,
        ChaincodeEventsRequest, FilteredBlockEventsBuilder, UnsignedChaincodeEventsRequest,
    },
    proposal::{ProposalBuilder, SignedProposal, UnsignedProposal},
    transaction::{SignedTransaction, UnsignedTransaction},
    transport::GatewayService,
};
use ledger_gateway::crypto::SigningIdentity;
use std::{fmt, sync::Arc};

/// A client-side view of one identity's interactions with a gateway.
///
/// Cheap to clone; every phase object in the transaction and event flows
/// holds its own handle so it can be signed and dispatched independently.
#[derive(Clone)]
pub struct GatewayClient {
    service: Arc<dyn GatewayService>,
    signing_identity: Arc<SigningIdentity>,
}

impl GatewayClient {
    pub fn new(service: Arc<dyn GatewayService>, signing_identity: SigningIdentity) -> Self {
        Self {
            service,
            signing_identity: Arc::new(signing_identity),
        }
    }

    pub fn signing_identity(&self) -> &SigningIdentity {
        &self.signing_identity
    }

    pub(crate) fn service(&self) -> &dyn GatewayService {
        self.service.as_ref()
    }

    /// Starts a transaction proposal against a named chaincode function.
    pub fn proposal(
        &self,
        channel_name: impl Into<String>,
        chaincode_name: impl Into<String>,
        transaction_name: impl Into<String>,
    ) -> ProposalBuilder {
        ProposalBuilder::new(
            self.clone(),
            channel_name.into(),
            chaincode_name.into(),
            transaction_name.into(),
        )
    }

    /// Starts a chaincode event subscription on a channel.
    pub fn chaincode_events(
        &self,
        channel_name: impl Into<String>,
        chaincode_name: impl Into<String>,
    ) -> ChaincodeEventsBuilder {
        ChaincodeEventsBuilder::new(self.clone(), channel_name.into(), chaincode_name.into())
    }

    /// Starts a full block event subscription on a channel.
    pub fn block_events(&self, channel_name: impl Into<String>) -> BlockEventsBuilder {
        BlockEventsBuilder::new(self.clone(), channel_name.into())
    }

    /// Starts a filtered block event subscription on a channel.
    pub fn filtered_block_events(
        &self,
        channel_name: impl Into<String>,
    ) -> FilteredBlockEventsBuilder {
        FilteredBlockEventsBuilder::new(self.clone(), channel_name.into())
    }

    /// Starts a block event subscription that includes private data
    /// collections visible to this identity.
    pub fn block_and_private_data_events(
        &self,
        channel_name: impl Into<String>,
    ) -> BlockAndPrivateDataEventsBuilder {
        BlockAndPrivateDataEventsBuilder::new(self.clone(), channel_name.into())
    }

    // Reconstruction entry points for deferred signing flows: each rebuilds
    // a phase object from bytes produced in another process, preserving its
    // transaction ID and signing digest.

    pub fn proposal_from_bytes(&self, bytes: &[u8]) -> Result<UnsignedProposal> {
        UnsignedProposal::from_bytes(self, bytes)
    }

    pub fn signed_proposal(&self, bytes: &[u8], signature: &[u8]) -> Result<SignedProposal> {
        SignedProposal::from_bytes(self, bytes, signature)
    }

    pub fn transaction_from_bytes(&self, bytes: &[u8]) -> Result<UnsignedTransaction> {
        UnsignedTransaction::from_bytes(self, bytes)
    }

    pub fn signed_transaction(&self, bytes: &[u8], signature: &[u8]) -> Result<SignedTransaction> {
        SignedTransaction::from_bytes(self, bytes, signature)
    }

    pub fn commit_from_bytes(&self, bytes: &[u8]) -> Result<UnsignedCommit> {
        UnsignedCommit::from_bytes(self, bytes)
    }

    pub fn signed_commit(&self, bytes: &[u8], signature: &[u8]) -> Result<SignedCommit> {
        SignedCommit::from_bytes(self, bytes, signature)
    }

    pub fn chaincode_events_request_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<UnsignedChaincodeEventsRequest> {
        UnsignedChaincodeEventsRequest::from_bytes(self, bytes)
    }

    pub fn signed_chaincode_events_request(
        &self,
        bytes: &[u8],
        signature: &[u8],
    ) -> Result<ChaincodeEventsRequest> {
        ChaincodeEventsRequest::from_bytes(self, bytes, signature)
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("signing_identity", &self.signing_identity)
            .finish_non_exhaustive()
    }
}
