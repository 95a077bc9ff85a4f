//! The boundary between protocol logic and the gRPC transport.
//!
//! This crate constructs and signs protocol messages but never owns a
//! network connection. Callers implement [`GatewayService`] over whatever
//! channel management, TLS, and retry policy they need and hand it to
//! [`crate::GatewayClient`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use ledger_gateway::protos::{
    common::Envelope,
    gateway::{
        ChaincodeEventsResponse, CommitStatusResponse, EndorseRequest, EndorseResponse,
        EvaluateRequest, EvaluateResponse, SignedChaincodeEventsRequest,
        SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
    },
    peer::DeliverResponse,
};
use std::time::Duration;
use tonic::Status;

/// Per-call configuration, passed through to the transport unmodified.
///
/// Options are taken by value on every call so a caller-held default can
/// never be mutated by the client.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overall deadline for the call, including streaming delivery.
    pub deadline: Option<Duration>,
}

/// A server-streaming RPC handle: the message stream plus a cancellation
/// hook.
///
/// The hook runs at most once, on the first [`Self::cancel`] call or on
/// drop, and must promptly abort the underlying RPC.
pub struct TransportStream<T> {
    stream: BoxStream<'static, Result<T, Status>>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> TransportStream<T> {
    pub fn new(
        stream: BoxStream<'static, Result<T, Status>>,
        cancel: Box<dyn FnOnce() + Send>,
    ) -> Self {
        Self {
            stream,
            cancel: Some(cancel),
        }
    }

    pub async fn next(&mut self) -> Option<Result<T, Status>> {
        use futures::StreamExt;
        self.stream.next().await
    }

    /// Aborts the underlying RPC. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl<T> Drop for TransportStream<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The per-RPC surface of the gateway and its block delivery services.
///
/// Requests handed to implementations are fully signed; implementations must
/// forward them verbatim and never inspect or mutate message contents.
#[async_trait]
pub trait GatewayService: Send + Sync {
    async fn evaluate(
        &self,
        request: EvaluateRequest,
        options: CallOptions,
    ) -> Result<EvaluateResponse, Status>;

    async fn endorse(
        &self,
        request: EndorseRequest,
        options: CallOptions,
    ) -> Result<EndorseResponse, Status>;

    async fn submit(
        &self,
        request: SubmitRequest,
        options: CallOptions,
    ) -> Result<SubmitResponse, Status>;

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        options: CallOptions,
    ) -> Result<CommitStatusResponse, Status>;

    async fn chaincode_events(
        &self,
        request: SignedChaincodeEventsRequest,
        options: CallOptions,
    ) -> Result<TransportStream<ChaincodeEventsResponse>, Status>;

    async fn block_events(
        &self,
        request: Envelope,
        options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status>;

    async fn filtered_block_events(
        &self,
        request: Envelope,
        options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status>;

    async fn block_and_private_data_events(
        &self,
        request: Envelope,
        options: CallOptions,
    ) -> Result<TransportStream<DeliverResponse>, Status>;
}
