//! Chaincode event subscriptions.
//!
//! The delivery protocol positions a resumed stream at block granularity.
//! Transaction-level resume is done here instead: events from transactions
//! the checkpoint already recorded for the resume block are dropped before
//! the consumer sees them.

use super::{start_position, CheckpointSnapshot};
use crate::{
    checkpoint::Checkpoint,
    client::GatewayClient,
    error::{GatewayClientError, Result},
    transport::{CallOptions, TransportStream},
};
use ledger_gateway::protos::gateway::{
    ChaincodeEventsRequest as ChaincodeEventsRequestProto, ChaincodeEventsResponse,
    SignedChaincodeEventsRequest,
};
use prost::Message;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Configures a chaincode event subscription.
#[derive(Debug)]
pub struct ChaincodeEventsBuilder {
    client: GatewayClient,
    channel_name: String,
    chaincode_name: String,
    start_block: Option<u64>,
    checkpoint: Option<CheckpointSnapshot>,
}

impl ChaincodeEventsBuilder {
    pub(crate) fn new(client: GatewayClient, channel_name: String, chaincode_name: String) -> Self {
        Self {
            client,
            channel_name,
            chaincode_name,
            start_block: None,
            checkpoint: None,
        }
    }

    /// Requests delivery from an exact block number. Ignored when a
    /// checkpoint with a recorded position is also supplied.
    pub fn start_block(mut self, block_number: u64) -> Self {
        self.start_block = Some(block_number);
        self
    }

    /// Resumes from a checkpointer's recorded position.
    pub fn checkpoint(mut self, checkpoint: &dyn Checkpoint) -> Self {
        self.checkpoint = Some(CheckpointSnapshot::capture(checkpoint));
        self
    }

    pub fn build(self) -> UnsignedChaincodeEventsRequest {
        let snapshot = self.checkpoint.unwrap_or_default();
        let request = ChaincodeEventsRequestProto {
            channel_id: self.channel_name,
            chaincode_id: self.chaincode_name,
            identity: self.client.signing_identity().creator().to_vec(),
            start_position: Some(start_position(snapshot.block_number, self.start_block)),
        };

        UnsignedChaincodeEventsRequest {
            client: self.client,
            signed_request: SignedChaincodeEventsRequest {
                request: request.encode_to_vec(),
                signature: Vec::new(),
            },
            skip: snapshot,
        }
    }
}

/// A chaincode events request awaiting its signature.
#[derive(Debug)]
pub struct UnsignedChaincodeEventsRequest {
    client: GatewayClient,
    signed_request: SignedChaincodeEventsRequest,
    skip: CheckpointSnapshot,
}

impl UnsignedChaincodeEventsRequest {
    /// Rebuilds a request from [`Self::bytes`] output. Transaction-level
    /// skip state is not part of the serialized form; resupply the
    /// checkpoint through [`ChaincodeEventsBuilder`] if it is needed.
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
        let signed_request = SignedChaincodeEventsRequest::decode(bytes)?;
        Ok(Self {
            client: client.clone(),
            signed_request,
            skip: CheckpointSnapshot::default(),
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.signed_request.encode_to_vec()
    }

    /// The value a signer must sign: the identity's digest of the serialized
    /// events request.
    pub fn digest(&self) -> Vec<u8> {
        self.client
            .signing_identity()
            .hash(&self.signed_request.request)
    }

    pub async fn sign(self) -> Result<ChaincodeEventsRequest> {
        let digest = self.digest();
        let signature = self.client.signing_identity().sign(&digest).await?;
        Ok(self.into_signed(&signature))
    }

    /// Applies an externally produced signature over [`Self::digest`].
    pub fn into_signed(mut self, signature: &[u8]) -> ChaincodeEventsRequest {
        self.signed_request.signature = signature.to_vec();
        ChaincodeEventsRequest {
            client: self.client,
            signed_request: self.signed_request,
            skip: self.skip,
        }
    }
}

/// A signed chaincode events request, ready to open the stream.
#[derive(Debug)]
pub struct ChaincodeEventsRequest {
    client: GatewayClient,
    signed_request: SignedChaincodeEventsRequest,
    skip: CheckpointSnapshot,
}

impl ChaincodeEventsRequest {
    pub fn from_bytes(client: &GatewayClient, bytes: &[u8], signature: &[u8]) -> Result<Self> {
        Ok(UnsignedChaincodeEventsRequest::from_bytes(client, bytes)?.into_signed(signature))
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.signed_request.encode_to_vec()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signed_request.signature
    }

    pub async fn events(&self, options: CallOptions) -> Result<ChaincodeEventStream> {
        debug!("opening chaincode event stream");
        let stream = self
            .client
            .service()
            .chaincode_events(self.signed_request.clone(), options)
            .await
            .map_err(|status| GatewayClientError::gateway_failed(None, status))?;

        Ok(ChaincodeEventStream::new(stream, self.skip.clone()))
    }
}

/// A single chaincode event with its ledger coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub block_number: u64,
    pub transaction_id: String,
    pub chaincode_name: String,
    pub event_name: String,
    pub payload: Vec<u8>,
}

/// Delivers chaincode events one at a time, flattening the per-block
/// responses and dropping already-checkpointed transactions in the resume
/// block.
pub struct ChaincodeEventStream {
    stream: TransportStream<ChaincodeEventsResponse>,
    buffered: VecDeque<ChaincodeEvent>,
    skip_block: Option<u64>,
    skip_transaction_ids: HashSet<String>,
    ended: bool,
}

impl ChaincodeEventStream {
    fn new(stream: TransportStream<ChaincodeEventsResponse>, skip: CheckpointSnapshot) -> Self {
        Self {
            stream,
            buffered: VecDeque::new(),
            skip_block: skip.block_number,
            skip_transaction_ids: skip.transaction_ids,
            ended: false,
        }
    }

    /// The next event, or `None` once the stream has ended. After an error
    /// the stream is closed and yields `None`.
    pub async fn next(&mut self) -> Option<Result<ChaincodeEvent>> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                return Some(Ok(event));
            }
            if self.ended {
                return None;
            }
            match self.stream.next().await {
                Some(Ok(response)) => self.buffer_block(response),
                Some(Err(status)) => {
                    self.ended = true;
                    self.stream.cancel();
                    return Some(Err(GatewayClientError::gateway_failed(None, status)));
                }
                None => {
                    self.ended = true;
                    return None;
                }
            }
        }
    }

    fn buffer_block(&mut self, response: ChaincodeEventsResponse) {
        let block_number = response.block_number;
        let replayed_block = Some(block_number) == self.skip_block;
        for event in response.events {
            if replayed_block && self.skip_transaction_ids.contains(&event.tx_id) {
                continue;
            }
            self.buffered.push_back(ChaincodeEvent {
                block_number,
                transaction_id: event.tx_id,
                chaincode_name: event.chaincode_id,
                event_name: event.event_name,
                payload: event.payload,
            });
        }
    }

    /// Cancels the server-side RPC. Also happens on drop.
    pub fn close(&mut self) {
        self.stream.cancel();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        checkpoint::{Checkpointer, InMemoryCheckpointer},
        testing::{test_client, test_client_with_gateway, MockGateway},
    };
    use ledger_gateway::protos::{
        orderer::seek_position,
        peer::ChaincodeEvent as ChaincodeEventProto,
    };
    use std::sync::Arc;

    fn response(block_number: u64, transaction_ids: &[&str]) -> ChaincodeEventsResponse {
        ChaincodeEventsResponse {
            block_number,
            events: transaction_ids
                .iter()
                .map(|tx_id| ChaincodeEventProto {
                    chaincode_id: "basic".to_string(),
                    tx_id: tx_id.to_string(),
                    event_name: "event".to_string(),
                    payload: b"payload".to_vec(),
                })
                .collect(),
        }
    }

    fn decoded_start(request: &UnsignedChaincodeEventsRequest) -> Option<seek_position::Type> {
        let proto = SignedChaincodeEventsRequest::decode(request.bytes().as_slice()).ok()?;
        let inner = ChaincodeEventsRequestProto::decode(proto.request.as_slice()).ok()?;
        inner.start_position?.r#type
    }

    #[test]
    fn default_subscription_starts_at_next_commit() {
        let request = test_client().chaincode_events("mychannel", "basic").build();
        assert!(matches!(
            decoded_start(&request),
            Some(seek_position::Type::NextCommit(_))
        ));
    }

    #[test]
    fn checkpoint_position_overrides_start_block() -> anyhow::Result<()> {
        let mut checkpointer = InMemoryCheckpointer::new();
        checkpointer.checkpoint(499, None)?;

        let request = test_client()
            .chaincode_events("mychannel", "basic")
            .start_block(418)
            .checkpoint(&checkpointer)
            .build();

        match decoded_start(&request) {
            Some(seek_position::Type::Specified(seek)) => assert_eq!(seek.number, 500),
            other => panic!("expected specified position, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn unused_checkpoint_falls_back_to_start_block() {
        let checkpointer = InMemoryCheckpointer::new();
        let request = test_client()
            .chaincode_events("mychannel", "basic")
            .start_block(418)
            .checkpoint(&checkpointer)
            .build();

        match decoded_start(&request) {
            Some(seek_position::Type::Specified(seek)) => assert_eq!(seek.number, 418),
            other => panic!("expected specified position, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn checkpointed_transactions_are_skipped_in_resume_block() -> anyhow::Result<()> {
        crate::testing::init_tracing();
        let gateway = Arc::new(MockGateway::default());
        gateway.push_chaincode_events(Ok(response(5, &["tx1", "tx2", "tx3"])));
        gateway.push_chaincode_events(Ok(response(6, &["tx1"])));
        let client = test_client_with_gateway(gateway);

        let mut checkpointer = InMemoryCheckpointer::new();
        checkpointer.checkpoint(5, Some("tx1"))?;
        checkpointer.checkpoint(5, Some("tx2"))?;

        let mut stream = client
            .chaincode_events("mychannel", "basic")
            .checkpoint(&checkpointer)
            .build()
            .sign()
            .await?
            .events(CallOptions::default())
            .await?;

        let mut seen = Vec::new();
        while let Some(event) = stream.next().await {
            let event = event?;
            seen.push((event.block_number, event.transaction_id));
        }

        // tx1 repeats in block 6; only the block 5 replay is suppressed.
        assert_eq!(
            seen,
            vec![
                (5, "tx3".to_string()),
                (6, "tx1".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn close_cancels_the_rpc_exactly_once() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        gateway.push_chaincode_events(Ok(response(1, &["tx1"])));
        let client = test_client_with_gateway(gateway.clone());

        let mut stream = client
            .chaincode_events("mychannel", "basic")
            .build()
            .sign()
            .await?
            .events(CallOptions::default())
            .await?;

        stream.close();
        stream.close();
        drop(stream);
        assert_eq!(gateway.cancel_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn signed_request_is_forwarded_verbatim() -> anyhow::Result<()> {
        let gateway = Arc::new(MockGateway::default());
        let client = test_client_with_gateway(gateway.clone());

        let signed = client
            .chaincode_events("mychannel", "basic")
            .build()
            .sign()
            .await?;
        let bytes = signed.bytes();
        let _stream = signed.events(CallOptions::default()).await?;

        let requests = gateway.chaincode_events_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].encode_to_vec(), bytes);
        assert!(!requests[0].signature.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn detached_signing_round_trips() -> anyhow::Result<()> {
        let client = test_client();
        let request = client.chaincode_events("mychannel", "basic").build();
        let bytes = request.bytes();
        let digest = request.digest();

        let rebuilt = UnsignedChaincodeEventsRequest::from_bytes(&client, &bytes)?;
        assert_eq!(rebuilt.bytes(), bytes);
        assert_eq!(rebuilt.digest(), digest);

        let signature = client.signing_identity().sign(&digest).await?;
        let signed = rebuilt.into_signed(&signature);
        assert_eq!(signed.signature(), signature);
        Ok(())
    }
}
