//! Proposal construction and the evaluate and endorse actions.
//!
//! A proposal moves through two immutable phases. [`UnsignedProposal`]
//! exposes its serialized form and signing digest so a signature can be
//! produced elsewhere; applying a signature yields a [`SignedProposal`],
//! which is the only type able to reach the gateway. Each phase can be
//! reconstructed from its serialized bytes on a different process.

use crate::{
    client::GatewayClient,
    context::{build_header, TransactionContext},
    error::{GatewayClientError, Result},
    transaction::UnsignedTransaction,
    transport::CallOptions,
};
use ledger_gateway::protos::{
    common::{ChannelHeader, Header, HeaderType},
    gateway::{EndorseRequest, EvaluateRequest, PreparedTransaction, ProposedTransaction},
    peer::{
        ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
        ChaincodeProposalPayload, ChaincodeSpec, Proposal, SignedProposal as SignedProposalProto,
    },
};
use prost::Message;
use std::collections::HashMap;
use tracing::debug;

/// Accumulates the content of a transaction proposal.
#[derive(Debug)]
pub struct ProposalBuilder {
    client: GatewayClient,
    channel_name: String,
    chaincode_name: String,
    transaction_name: String,
    arguments: Vec<Vec<u8>>,
    transient_data: HashMap<String, Vec<u8>>,
    endorsing_organizations: Vec<String>,
}

impl ProposalBuilder {
    pub(crate) fn new(
        client: GatewayClient,
        channel_name: String,
        chaincode_name: String,
        transaction_name: String,
    ) -> Self {
        Self {
            client,
            channel_name,
            chaincode_name,
            transaction_name,
            arguments: Vec::new(),
            transient_data: HashMap::new(),
            endorsing_organizations: Vec::new(),
        }
    }

    pub fn add_argument(mut self, argument: impl Into<Vec<u8>>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn arguments<I, A>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Private state passed to endorsing peers but never written to the
    /// ledger.
    pub fn transient_data<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.transient_data.extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Restricts endorsement to the named organizations instead of letting
    /// the gateway choose.
    pub fn endorsing_organizations<I, S>(mut self, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endorsing_organizations
            .extend(organizations.into_iter().map(Into::into));
        self
    }

    /// Derives a fresh transaction context and assembles the proposal.
    pub fn build(self) -> UnsignedProposal {
        let signing_identity = self.client.signing_identity();
        let context = TransactionContext::new(signing_identity);

        let chaincode_id = ChaincodeId {
            name: self.chaincode_name,
            ..Default::default()
        };

        let mut args = Vec::with_capacity(self.arguments.len() + 1);
        args.push(self.transaction_name.into_bytes());
        args.extend(self.arguments);

        let invocation_spec = ChaincodeInvocationSpec {
            chaincode_spec: Some(ChaincodeSpec {
                r#type: 0,
                chaincode_id: Some(chaincode_id.clone()),
                input: Some(ChaincodeInput { args }),
            }),
        };
        let proposal_payload = ChaincodeProposalPayload {
            input: invocation_spec.encode_to_vec(),
            transient_map: self.transient_data,
        };

        let extension = ChaincodeHeaderExtension {
            chaincode_id: Some(chaincode_id),
        };
        let header = build_header(
            HeaderType::EndorserTransaction as i32,
            &self.channel_name,
            &context,
            signing_identity,
            extension.encode_to_vec(),
        );

        let proposal = Proposal {
            header: header.encode_to_vec(),
            payload: proposal_payload.encode_to_vec(),
            extension: Vec::new(),
        };

        let proposed_transaction = ProposedTransaction {
            transaction_id: context.transaction_id().to_string(),
            proposal: Some(SignedProposalProto {
                proposal_bytes: proposal.encode_to_vec(),
                signature: Vec::new(),
            }),
            endorsing_organizations: self.endorsing_organizations,
        };

        UnsignedProposal {
            client: self.client,
            proposed_transaction,
        }
    }
}

/// An assembled proposal awaiting its signature.
#[derive(Debug)]
pub struct UnsignedProposal {
    client: GatewayClient,
    proposed_transaction: ProposedTransaction,
}

impl UnsignedProposal {
    /// Rebuilds a proposal from [`Self::bytes`] output, typically in a
    /// different process from the one that created it.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
        let proposed_transaction = ProposedTransaction::decode(bytes)?;
        if proposed_transaction.proposal.is_none() {
            return Err(GatewayClientError::MissingField("proposal"));
        }
        Ok(Self {
            client: client.clone(),
            proposed_transaction,
        })
    }

    pub fn transaction_id(&self) -> &str {
        &self.proposed_transaction.transaction_id
    }

    /// Serialized form, suitable for transfer to a signing environment.
    pub fn bytes(&self) -> Vec<u8> {
        self.proposed_transaction.encode_to_vec()
    }

    /// The value a signer must sign: the identity's digest of the inner
    /// proposal bytes.
    pub fn digest(&self) -> Vec<u8> {
        self.client
            .signing_identity()
            .hash(proposal_bytes(&self.proposed_transaction))
    }

    /// Signs with the client's own signer.
    pub async fn sign(self) -> Result<SignedProposal> {
        let digest = self.digest();
        let signature = self.client.signing_identity().sign(&digest).await?;
        Ok(self.into_signed(&signature))
    }

    /// Applies an externally produced signature over [`Self::digest`].
    pub fn into_signed(mut self, signature: &[u8]) -> SignedProposal {
        if let Some(proposal) = self.proposed_transaction.proposal.as_mut() {
            proposal.signature = signature.to_vec();
        }
        SignedProposal {
            client: self.client,
            proposed_transaction: self.proposed_transaction,
        }
    }
}

/// A signed proposal, ready to evaluate or endorse.
#[derive(Debug)]
pub struct SignedProposal {
    client: GatewayClient,
    proposed_transaction: ProposedTransaction,
}

impl SignedProposal {
    /// Rebuilds a signed proposal from unsigned proposal bytes and a
    /// detached signature.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8], signature: &[u8]) -> Result<Self> {
        Ok(UnsignedProposal::from_bytes(client, bytes)?.into_signed(signature))
    }

    pub fn transaction_id(&self) -> &str {
        &self.proposed_transaction.transaction_id
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.proposed_transaction.encode_to_vec()
    }

    pub fn signature(&self) -> &[u8] {
        self.proposed_transaction
            .proposal
            .as_ref()
            .map(|proposal| proposal.signature.as_slice())
            .unwrap_or_default()
    }

    /// Executes the transaction on a single peer without submitting it for
    /// ordering. Returns the chaincode response payload.
    pub async fn evaluate(&self, options: CallOptions) -> Result<Vec<u8>> {
        let channel_header = self.verified_channel_header()?;
        let request = EvaluateRequest {
            transaction_id: self.proposed_transaction.transaction_id.clone(),
            channel_id: channel_header.channel_id,
            proposed_transaction: self.proposed_transaction.proposal.clone(),
            target_organizations: self.proposed_transaction.endorsing_organizations.clone(),
        };

        debug!(transaction_id = %request.transaction_id, "evaluating proposal");
        let response = self
            .client
            .service()
            .evaluate(request, options)
            .await
            .map_err(|status| {
                GatewayClientError::gateway_failed(Some(self.transaction_id()), status)
            })?;

        let result = response
            .result
            .ok_or(GatewayClientError::MissingField("result"))?;
        Ok(result.payload)
    }

    /// Collects endorsements from the gateway, yielding a transaction ready
    /// to sign and submit for ordering.
    pub async fn endorse(&self, options: CallOptions) -> Result<UnsignedTransaction> {
        let channel_header = self.verified_channel_header()?;
        let request = EndorseRequest {
            transaction_id: self.proposed_transaction.transaction_id.clone(),
            channel_id: channel_header.channel_id,
            proposed_transaction: self.proposed_transaction.proposal.clone(),
            endorsing_organizations: self.proposed_transaction.endorsing_organizations.clone(),
        };

        debug!(transaction_id = %request.transaction_id, "endorsing proposal");
        let response = self
            .client
            .service()
            .endorse(request, options)
            .await
            .map_err(|status| {
                GatewayClientError::endorse_failed(self.transaction_id(), status)
            })?;

        let envelope = response
            .prepared_transaction
            .ok_or(GatewayClientError::MissingField("prepared_transaction"))?;
        Ok(UnsignedTransaction::new(
            self.client.clone(),
            PreparedTransaction {
                transaction_id: self.proposed_transaction.transaction_id.clone(),
                envelope: Some(envelope),
            },
        ))
    }

    /// Decodes the channel header nested in the proposal and checks its
    /// transaction ID against the one this request claims.
    fn verified_channel_header(&self) -> Result<ChannelHeader> {
        let proposal = Proposal::decode(proposal_bytes(&self.proposed_transaction))?;
        let header = Header::decode(proposal.header.as_slice())?;
        let channel_header = ChannelHeader::decode(header.channel_header.as_slice())?;

        if channel_header.tx_id != self.proposed_transaction.transaction_id {
            return Err(GatewayClientError::TransactionIdMismatch {
                header: channel_header.tx_id,
                request: self.proposed_transaction.transaction_id.clone(),
            });
        }
        Ok(channel_header)
    }
}

fn proposal_bytes(proposed_transaction: &ProposedTransaction) -> &[u8] {
    proposed_transaction
        .proposal
        .as_ref()
        .map(|proposal| proposal.proposal_bytes.as_slice())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{
        test_client, test_client_with_counting_signer, test_client_with_gateway, MockGateway,
    };
    use std::sync::atomic::Ordering;
    use ledger_gateway::protos::{common, gateway, peer};
    use std::sync::Arc;

    fn build_proposal(client: &GatewayClient) -> UnsignedProposal {
        client
            .proposal("mychannel", "basic", "CreateAsset")
            .add_argument("asset1")
            .add_argument("100")
            .build()
    }

    #[test]
    fn first_chaincode_argument_is_transaction_name() -> anyhow::Result<()> {
        let proposal = build_proposal(&test_client());

        let proposed = gateway::ProposedTransaction::decode(proposal.bytes().as_slice())?;
        let signed = proposed.proposal.ok_or_else(|| anyhow::anyhow!("no proposal"))?;
        let inner = peer::Proposal::decode(signed.proposal_bytes.as_slice())?;
        let payload = peer::ChaincodeProposalPayload::decode(inner.payload.as_slice())?;
        let invocation = peer::ChaincodeInvocationSpec::decode(payload.input.as_slice())?;
        let spec = invocation
            .chaincode_spec
            .ok_or_else(|| anyhow::anyhow!("no spec"))?;
        let input = spec.input.ok_or_else(|| anyhow::anyhow!("no input"))?;

        assert_eq!(
            input.args,
            vec![
                b"CreateAsset".to_vec(),
                b"asset1".to_vec(),
                b"100".to_vec()
            ]
        );
        Ok(())
    }

    #[test]
    fn header_and_request_agree_on_transaction_id() -> anyhow::Result<()> {
        let proposal = build_proposal(&test_client());
        let transaction_id = proposal.transaction_id().to_string();

        let proposed = gateway::ProposedTransaction::decode(proposal.bytes().as_slice())?;
        let signed = proposed.proposal.ok_or_else(|| anyhow::anyhow!("no proposal"))?;
        let inner = peer::Proposal::decode(signed.proposal_bytes.as_slice())?;
        let header = common::Header::decode(inner.header.as_slice())?;
        let channel_header = common::ChannelHeader::decode(header.channel_header.as_slice())?;

        assert_eq!(channel_header.tx_id, transaction_id);
        assert_eq!(channel_header.channel_id, "mychannel");
        Ok(())
    }

    #[test]
    fn reconstructed_proposal_round_trips() -> anyhow::Result<()> {
        let client = test_client();
        let proposal = build_proposal(&client);
        let bytes = proposal.bytes();
        let digest = proposal.digest();

        let rebuilt = UnsignedProposal::from_bytes(&client, &bytes)?;
        assert_eq!(rebuilt.transaction_id(), proposal.transaction_id());
        assert_eq!(rebuilt.bytes(), bytes);
        assert_eq!(rebuilt.digest(), digest);
        Ok(())
    }

    #[test]
    fn malformed_proposal_bytes_are_rejected() {
        let client = test_client();
        let empty = gateway::ProposedTransaction::default().encode_to_vec();
        let result = UnsignedProposal::from_bytes(&client, &empty);
        assert!(matches!(
            result,
            Err(GatewayClientError::MissingField("proposal"))
        ));
    }

    #[tokio::test]
    async fn evaluate_sends_channel_from_nested_header() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        let client = test_client_with_gateway(gateway.clone());

        let signed = build_proposal(&client).sign().await?;
        let result = signed.evaluate(CallOptions::default()).await?;
        assert_eq!(result, b"evaluate-result");

        let requests = gateway.evaluate_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].channel_id, "mychannel");
        assert_eq!(requests[0].transaction_id, signed.transaction_id());
        Ok(())
    }

    #[tokio::test]
    async fn tampered_transaction_id_is_rejected_before_sending() -> anyhow::Result<()> {
        let client = test_client();
        let proposal = build_proposal(&client);

        let mut proposed = gateway::ProposedTransaction::decode(proposal.bytes().as_slice())?;
        proposed.transaction_id = "forged".to_string();
        let signed = SignedProposal::from_bytes(&client, &proposed.encode_to_vec(), b"sig")?;

        let result = signed.evaluate(CallOptions::default()).await;
        assert!(matches!(
            result,
            Err(GatewayClientError::TransactionIdMismatch { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn endorse_yields_transaction_with_same_id() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        let client = test_client_with_gateway(gateway.clone());

        let signed = build_proposal(&client).sign().await?;
        let transaction = signed.endorse(CallOptions::default()).await?;

        assert_eq!(transaction.transaction_id(), signed.transaction_id());
        assert_eq!(transaction.result()?, b"endorse-result");

        let requests = gateway.endorse_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].channel_id, "mychannel");
        Ok(())
    }

    #[tokio::test]
    async fn evaluate_failure_carries_status_details() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        gateway.set_evaluate(Err(tonic::Status::aborted("no peers available")));
        let client = test_client_with_gateway(gateway);

        let signed = build_proposal(&client).sign().await?;
        let error = signed.evaluate(CallOptions::default()).await.unwrap_err();

        match error {
            GatewayClientError::Gateway(inner) => {
                assert_eq!(inner.code, tonic::Code::Aborted);
                assert_eq!(inner.transaction_id.as_deref(), Some(signed.transaction_id()));
            }
            other => panic!("expected gateway error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn endorse_failure_is_the_endorse_variant() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        gateway.set_endorse(Err(tonic::Status::unavailable("orderer unreachable")));
        let client = test_client_with_gateway(gateway);

        let signed = build_proposal(&client).sign().await?;
        let error = signed.endorse(CallOptions::default()).await.unwrap_err();
        assert!(matches!(error, GatewayClientError::Endorse(_)));
        Ok(())
    }

    #[tokio::test]
    async fn repeated_actions_never_recompute_the_signature() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        let (client, signings) = test_client_with_counting_signer(gateway);

        let signed = client
            .proposal("mychannel", "basic", "GetAllAssets")
            .build()
            .sign()
            .await?;
        assert_eq!(signings.load(Ordering::SeqCst), 1);

        let _ = signed.evaluate(CallOptions::default()).await?;
        let _ = signed.evaluate(CallOptions::default()).await?;
        let _ = signed.endorse(CallOptions::default()).await?;
        assert_eq!(signings.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn offline_signature_application_matches_local_signing() -> anyhow::Result<()> {
        // ECDSA here is deterministic (RFC 6979), so signing the same digest
        // in a detached flow must produce the same signed bytes.
        let client = test_client();
        let proposal = build_proposal(&client);
        let bytes = proposal.bytes();

        let rebuilt = UnsignedProposal::from_bytes(&client, &bytes)?;
        let signature = client.signing_identity().sign(&rebuilt.digest()).await?;
        let detached = rebuilt.into_signed(&signature);

        let local = UnsignedProposal::from_bytes(&client, &bytes)?.sign().await?;
        assert_eq!(detached.bytes(), local.bytes());
        assert_eq!(detached.signature(), local.signature());
        Ok(())
    }
}
