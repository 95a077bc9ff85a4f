//! Scripted gateway transport and fixtures shared across unit tests.

use crate::{
    client::GatewayClient,
    transport::{CallOptions, GatewayService, TransportStream},
};
use async_trait::async_trait;
use ledger_gateway::{
    crypto::{CryptoError, Identity, PrivateKey, PrivateKeySigner, Sign, SigningIdentity},
    protos::{
        common::{
            Block, BlockHeader, ChannelHeader, Envelope, Header, HeaderType, Payload,
            SignatureHeader,
        },
        gateway::{
            ChaincodeEventsResponse, CommitStatusResponse, EndorseRequest, EndorseResponse,
            EvaluateRequest, EvaluateResponse, PreparedTransaction, SignedChaincodeEventsRequest,
            SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
        },
        peer::{
            deliver_response, ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction,
            DeliverResponse, ProposalResponsePayload, Response, Transaction, TransactionAction,
            TxValidationCode,
        },
    },
};
use prost::Message;
use rand::rngs::OsRng;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tonic::Status;

/// A [`GatewayService`] whose responses are scripted up front and whose
/// requests are captured for assertion.
#[derive(Default)]
pub(crate) struct MockGateway {
    evaluate_response: Mutex<Option<Result<EvaluateResponse, Status>>>,
    endorse_response: Mutex<Option<Result<EndorseResponse, Status>>>,
    submit_response: Mutex<Option<Result<SubmitResponse, Status>>>,
    commit_status_response: Mutex<Option<Result<CommitStatusResponse, Status>>>,
    chaincode_events_responses: Mutex<Vec<Result<ChaincodeEventsResponse, Status>>>,
    deliver_responses: Mutex<Vec<Result<DeliverResponse, Status>>>,

    evaluate_requests: Mutex<Vec<EvaluateRequest>>,
    endorse_requests: Mutex<Vec<EndorseRequest>>,
    submit_requests: Mutex<Vec<SubmitRequest>>,
    commit_status_requests: Mutex<Vec<SignedCommitStatusRequest>>,
    chaincode_events_requests: Mutex<Vec<SignedChaincodeEventsRequest>>,
    deliver_requests: Mutex<Vec<Envelope>>,

    cancels: Arc<AtomicUsize>,
}

impl MockGateway {
    pub(crate) fn set_evaluate(&self, response: Result<EvaluateResponse, Status>) {
        *lock(&self.evaluate_response) = Some(response);
    }

    pub(crate) fn set_endorse(&self, response: Result<EndorseResponse, Status>) {
        *lock(&self.endorse_response) = Some(response);
    }

    pub(crate) fn set_submit(&self, response: Result<SubmitResponse, Status>) {
        *lock(&self.submit_response) = Some(response);
    }

    pub(crate) fn set_commit_status(&self, response: Result<CommitStatusResponse, Status>) {
        *lock(&self.commit_status_response) = Some(response);
    }

    pub(crate) fn push_chaincode_events(
        &self,
        response: Result<ChaincodeEventsResponse, Status>,
    ) {
        lock(&self.chaincode_events_responses).push(response);
    }

    pub(crate) fn push_deliver_response(&self, response: Result<DeliverResponse, Status>) {
        lock(&self.deliver_responses).push(response);
    }

    pub(crate) fn evaluate_requests(&self) -> Vec<EvaluateRequest> {
        lock(&self.evaluate_requests).clone()
    }

    pub(crate) fn endorse_requests(&self) -> Vec<EndorseRequest> {
        lock(&self.endorse_requests).clone()
    }

    pub(crate) fn submit_requests(&self) -> Vec<SubmitRequest> {
        lock(&self.submit_requests).clone()
    }

    pub(crate) fn commit_status_requests(&self) -> Vec<SignedCommitStatusRequest> {
        lock(&self.commit_status_requests).clone()
    }

    pub(crate) fn chaincode_events_requests(&self) -> Vec<SignedChaincodeEventsRequest> {
        lock(&self.chaincode_events_requests).clone()
    }

    pub(crate) fn deliver_requests(&self) -> Vec<Envelope> {
        lock(&self.deliver_requests).clone()
    }

    pub(crate) fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    fn deliver_stream<T: Send + 'static>(
        &self,
        responses: Vec<Result<T, Status>>,
    ) -> TransportStream<T> {
        let cancels = self.cancels.clone();
        TransportStream::new(
            Box::pin(tokio_stream::iter(responses)),
            Box::new(move || {
                let _ = cancels.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GatewayService for MockGateway {
    async fn evaluate(
        &self,
        request: EvaluateRequest,
        _options: CallOptions,
    ) -> Result<EvaluateResponse, Status> {
        lock(&self.evaluate_requests).push(request);
        lock(&self.evaluate_response).take().unwrap_or_else(|| {
            Ok(EvaluateResponse {
                result: Some(Response {
                    status: 200,
                    message: String::new(),
                    payload: b"evaluate-result".to_vec(),
                }),
            })
        })
    }

    async fn endorse(
        &self,
        request: EndorseRequest,
        _options: CallOptions,
    ) -> Result<EndorseResponse, Status> {
        let transaction_id = request.transaction_id.clone();
        let channel_id = request.channel_id.clone();
        lock(&self.endorse_requests).push(request);
        lock(&self.endorse_response).take().unwrap_or_else(|| {
            let prepared = endorsed_transaction(&transaction_id, &channel_id, b"endorse-result");
            Ok(EndorseResponse {
                prepared_transaction: prepared.envelope,
            })
        })
    }

    async fn submit(
        &self,
        request: SubmitRequest,
        _options: CallOptions,
    ) -> Result<SubmitResponse, Status> {
        lock(&self.submit_requests).push(request);
        lock(&self.submit_response)
            .take()
            .unwrap_or_else(|| Ok(SubmitResponse {}))
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        _options: CallOptions,
    ) -> Result<CommitStatusResponse, Status> {
        lock(&self.commit_status_requests).push(request);
        lock(&self.commit_status_response).take().unwrap_or_else(|| {
            Ok(CommitStatusResponse {
                result: TxValidationCode::Valid as i32,
                block_number: 1,
            })
        })
    }

    async fn chaincode_events(
        &self,
        request: SignedChaincodeEventsRequest,
        _options: CallOptions,
    ) -> Result<TransportStream<ChaincodeEventsResponse>, Status> {
        lock(&self.chaincode_events_requests).push(request);
        let responses = std::mem::take(&mut *lock(&self.chaincode_events_responses));
        Ok(self.deliver_stream(responses))
    }

    async fn block_events(
        &self,
        request: Envelope,
        _options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status> {
        lock(&self.deliver_requests).push(request);
        let responses = std::mem::take(&mut *lock(&self.deliver_responses));
        Ok(self.deliver_stream(responses))
    }

    async fn filtered_block_events(
        &self,
        request: Envelope,
        _options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status> {
        lock(&self.deliver_requests).push(request);
        let responses = std::mem::take(&mut *lock(&self.deliver_responses));
        Ok(self.deliver_stream(responses))
    }

    async fn block_and_private_data_events(
        &self,
        request: Envelope,
        _options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status> {
        lock(&self.deliver_requests).push(request);
        let responses = std::mem::take(&mut *lock(&self.deliver_responses));
        Ok(self.deliver_stream(responses))
    }
}

/// Opt-in log output while debugging a test: set `RUST_LOG` and run with
/// `--nocapture`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A client over a fresh [`MockGateway`] with a real P-256 signer, so
/// signing flows exercise the production code path end to end.
pub(crate) fn test_client() -> GatewayClient {
    test_client_with_gateway(Arc::new(MockGateway::default()))
}

pub(crate) fn test_client_with_gateway(gateway: Arc<MockGateway>) -> GatewayClient {
    let key = p256::ecdsa::SigningKey::random(&mut OsRng);
    let signing_identity = SigningIdentity::new(Identity::new("Org1MSP", b"certificate".to_vec()))
        .with_signer(Arc::new(PrivateKey::EcdsaP256(key).signer()));
    GatewayClient::new(gateway, signing_identity)
}

/// A signer that counts its invocations, for asserting that repeated
/// actions on a signed phase object never recompute the signature.
pub(crate) struct CountingSigner {
    inner: PrivateKeySigner,
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl Sign for CountingSigner {
    async fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let _ = self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(digest).await
    }
}

pub(crate) fn test_client_with_counting_signer(
    gateway: Arc<MockGateway>,
) -> (GatewayClient, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let key = p256::ecdsa::SigningKey::random(&mut OsRng);
    let signer = CountingSigner {
        inner: PrivateKey::EcdsaP256(key).signer(),
        count: count.clone(),
    };
    let signing_identity = SigningIdentity::new(Identity::new("Org1MSP", b"certificate".to_vec()))
        .with_signer(Arc::new(signer));
    (GatewayClient::new(gateway, signing_identity), count)
}

/// A structurally complete endorsed transaction whose chaincode response
/// payload is `result`.
pub(crate) fn endorsed_transaction(
    transaction_id: &str,
    channel_id: &str,
    result: &[u8],
) -> PreparedTransaction {
    let chaincode_action = ChaincodeAction {
        results: Vec::new(),
        events: Vec::new(),
        response: Some(Response {
            status: 200,
            message: String::new(),
            payload: result.to_vec(),
        }),
        chaincode_id: None,
    };
    let response_payload = ProposalResponsePayload {
        proposal_hash: Vec::new(),
        extension: chaincode_action.encode_to_vec(),
    };
    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: Vec::new(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: response_payload.encode_to_vec(),
            endorsements: Vec::new(),
        }),
    };
    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: Vec::new(),
            payload: action_payload.encode_to_vec(),
        }],
    };

    let channel_header = ChannelHeader {
        r#type: HeaderType::EndorserTransaction as i32,
        version: 0,
        timestamp: None,
        channel_id: channel_id.to_string(),
        tx_id: transaction_id.to_string(),
        epoch: 0,
        extension: Vec::new(),
    };
    let header = Header {
        channel_header: channel_header.encode_to_vec(),
        signature_header: SignatureHeader::default().encode_to_vec(),
    };
    let payload = Payload {
        header: Some(header),
        data: transaction.encode_to_vec(),
    };

    PreparedTransaction {
        transaction_id: transaction_id.to_string(),
        envelope: Some(Envelope {
            payload: payload.encode_to_vec(),
            signature: Vec::new(),
        }),
    }
}

/// A delivery response holding a full block with the given number.
pub(crate) fn block_response(number: u64) -> DeliverResponse {
    DeliverResponse {
        r#type: Some(deliver_response::Type::Block(Block {
            header: Some(BlockHeader {
                number,
                previous_hash: Vec::new(),
                data_hash: Vec::new(),
            }),
            data: None,
            metadata: None,
        })),
    }
}
