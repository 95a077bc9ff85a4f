//! Block event subscriptions over the delivery service.
//!
//! Three flavors share one request shape, a signed seek envelope: full
//! blocks, filtered blocks, and full blocks with private data. They differ
//! only in which delivery endpoint is called and which response variant is
//! expected back.

use super::start_position;
use crate::{
    checkpoint::Checkpoint,
    client::GatewayClient,
    context::{build_header, TransactionContext},
    error::{GatewayClientError, Result},
    transaction::envelope_channel_header,
    transport::{CallOptions, TransportStream},
};
use ledger_gateway::{
    constants::SEEK_LARGEST_BLOCK_NUMBER,
    protos::{
        common::{Block, Envelope, HeaderType, Payload},
        orderer::{SeekBehavior, SeekInfo, SeekPosition},
        peer::{deliver_response, BlockAndPrivateData, DeliverResponse, FilteredBlock},
    },
};
use prost::Message;
use tracing::debug;

/// The signable core shared by the three block event request flavors: a
/// seek envelope bound to a channel and a fresh transaction context.
#[derive(Debug)]
struct SeekRequest {
    client: GatewayClient,
    envelope: Envelope,
    transaction_id: String,
}

impl SeekRequest {
    fn build(
        client: GatewayClient,
        channel_name: &str,
        checkpoint_block: Option<u64>,
        start_block: Option<u64>,
    ) -> Self {
        let signing_identity = client.signing_identity();
        let context = TransactionContext::new(signing_identity);

        let seek_info = SeekInfo {
            start: Some(start_position(checkpoint_block, start_block)),
            stop: Some(SeekPosition::specified(SEEK_LARGEST_BLOCK_NUMBER)),
            behavior: SeekBehavior::BlockUntilReady as i32,
        };
        let header = build_header(
            HeaderType::DeliverSeekInfo as i32,
            channel_name,
            &context,
            signing_identity,
            Vec::new(),
        );
        let payload = Payload {
            header: Some(header),
            data: seek_info.encode_to_vec(),
        };
        let envelope = Envelope {
            payload: payload.encode_to_vec(),
            signature: Vec::new(),
        };
        let transaction_id = context.transaction_id().to_string();

        Self {
            client,
            envelope,
            transaction_id,
        }
    }

    fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
        let envelope = Envelope::decode(bytes)?;
        let channel_header = envelope_channel_header(&envelope)?;
        Ok(Self {
            client: client.clone(),
            envelope,
            transaction_id: channel_header.tx_id,
        })
    }

    fn bytes(&self) -> Vec<u8> {
        self.envelope.encode_to_vec()
    }

    fn digest(&self) -> Vec<u8> {
        self.client.signing_identity().hash(&self.envelope.payload)
    }

    async fn sign(self) -> Result<Self> {
        let digest = self.digest();
        let signature = self.client.signing_identity().sign(&digest).await?;
        Ok(self.into_signed(&signature))
    }

    fn into_signed(mut self, signature: &[u8]) -> Self {
        self.envelope.signature = signature.to_vec();
        self
    }
}

/// Delivery stream adapter shared by the three flavors. Terminal conditions
/// close the RPC: a status message, an unexpected variant, or a transport
/// error all end the stream after being reported once.
struct DeliverStream<E> {
    stream: TransportStream<DeliverResponse>,
    extract: fn(deliver_response::Type) -> Result<E>,
    ended: bool,
}

impl<E> DeliverStream<E> {
    fn new(
        stream: TransportStream<DeliverResponse>,
        extract: fn(deliver_response::Type) -> Result<E>,
    ) -> Self {
        Self {
            stream,
            extract,
            ended: false,
        }
    }

    async fn next(&mut self) -> Option<Result<E>> {
        if self.ended {
            return None;
        }
        match self.stream.next().await {
            Some(Ok(response)) => {
                let item = match response.r#type {
                    None => Err(GatewayClientError::UnexpectedStreamMessage(
                        "empty delivery response",
                    )),
                    Some(deliver_response::Type::Status(status)) => {
                        Err(GatewayClientError::StreamStatus { status })
                    }
                    Some(variant) => (self.extract)(variant),
                };
                if item.is_err() {
                    self.ended = true;
                    self.stream.cancel();
                }
                Some(item)
            }
            Some(Err(status)) => {
                self.ended = true;
                self.stream.cancel();
                Some(Err(GatewayClientError::gateway_failed(None, status)))
            }
            None => {
                self.ended = true;
                None
            }
        }
    }

    fn close(&mut self) {
        self.stream.cancel();
    }
}

fn extract_block(variant: deliver_response::Type) -> Result<Block> {
    match variant {
        deliver_response::Type::Block(block) => Ok(block),
        deliver_response::Type::FilteredBlock(_) => Err(
            GatewayClientError::UnexpectedStreamMessage("filtered block on full block stream"),
        ),
        deliver_response::Type::BlockAndPrivateData(_) => {
            Err(GatewayClientError::UnexpectedStreamMessage(
                "block with private data on full block stream",
            ))
        }
        deliver_response::Type::Status(status) => Err(GatewayClientError::StreamStatus { status }),
    }
}

fn extract_filtered_block(variant: deliver_response::Type) -> Result<FilteredBlock> {
    match variant {
        deliver_response::Type::FilteredBlock(block) => Ok(block),
        deliver_response::Type::Block(_) => Err(GatewayClientError::UnexpectedStreamMessage(
            "full block on filtered block stream",
        )),
        deliver_response::Type::BlockAndPrivateData(_) => {
            Err(GatewayClientError::UnexpectedStreamMessage(
                "block with private data on filtered block stream",
            ))
        }
        deliver_response::Type::Status(status) => Err(GatewayClientError::StreamStatus { status }),
    }
}

fn extract_block_and_private_data(
    variant: deliver_response::Type,
) -> Result<BlockAndPrivateData> {
    match variant {
        deliver_response::Type::BlockAndPrivateData(block) => Ok(block),
        deliver_response::Type::Block(_) => Err(GatewayClientError::UnexpectedStreamMessage(
            "full block on private data stream",
        )),
        deliver_response::Type::FilteredBlock(_) => Err(
            GatewayClientError::UnexpectedStreamMessage("filtered block on private data stream"),
        ),
        deliver_response::Type::Status(status) => Err(GatewayClientError::StreamStatus { status }),
    }
}

macro_rules! block_events_flavor {
    (
        $(#[$doc:meta])*
        $builder:ident, $unsigned:ident, $signed:ident, $stream:ident,
        $item:ty, $endpoint:ident, $extract:path
    ) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $builder {
            client: GatewayClient,
            channel_name: String,
            start_block: Option<u64>,
            checkpoint_block: Option<u64>,
        }

        impl $builder {
            pub(crate) fn new(client: GatewayClient, channel_name: String) -> Self {
                Self {
                    client,
                    channel_name,
                    start_block: None,
                    checkpoint_block: None,
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
                self.checkpoint_block = checkpoint.block_number();
                self
            }

            pub fn build(self) -> $unsigned {
                $unsigned(SeekRequest::build(
                    self.client,
                    &self.channel_name,
                    self.checkpoint_block,
                    self.start_block,
                ))
            }
        }

        /// A seek request awaiting its signature.
        #[derive(Debug)]
        pub struct $unsigned(SeekRequest);

        impl $unsigned {
            /// Rebuilds a request from [`Self::bytes`] output.
            pub fn from_bytes(client: &GatewayClient, bytes: &[u8]) -> Result<Self> {
                Ok(Self(SeekRequest::from_bytes(client, bytes)?))
            }

            pub fn transaction_id(&self) -> &str {
                &self.0.transaction_id
            }

            pub fn bytes(&self) -> Vec<u8> {
                self.0.bytes()
            }

            /// The value a signer must sign: the identity's digest of the
            /// envelope payload.
            pub fn digest(&self) -> Vec<u8> {
                self.0.digest()
            }

            pub async fn sign(self) -> Result<$signed> {
                Ok($signed(self.0.sign().await?))
            }

            /// Applies an externally produced signature over [`Self::digest`].
            pub fn into_signed(self, signature: &[u8]) -> $signed {
                $signed(self.0.into_signed(signature))
            }
        }

        /// A signed seek request, ready to open the stream.
        #[derive(Debug)]
        pub struct $signed(SeekRequest);

        impl $signed {
            pub fn from_bytes(
                client: &GatewayClient,
                bytes: &[u8],
                signature: &[u8],
            ) -> Result<Self> {
                Ok($unsigned::from_bytes(client, bytes)?.into_signed(signature))
            }

            pub fn transaction_id(&self) -> &str {
                &self.0.transaction_id
            }

            pub fn bytes(&self) -> Vec<u8> {
                self.0.bytes()
            }

            pub fn signature(&self) -> &[u8] {
                &self.0.envelope.signature
            }

            pub async fn events(&self, options: CallOptions) -> Result<$stream> {
                debug!(endpoint = stringify!($endpoint), "opening block event stream");
                let stream = self
                    .0
                    .client
                    .service()
                    .$endpoint(self.0.envelope.clone(), options)
                    .await
                    .map_err(|status| GatewayClientError::gateway_failed(None, status))?;
                Ok($stream(DeliverStream::new(stream, $extract)))
            }
        }

        /// Delivers one item per committed block until cancelled or ended.
        pub struct $stream(DeliverStream<$item>);

        impl $stream {
            /// The next block, or `None` once the stream has ended. After an
            /// error the stream is closed and yields `None`.
            pub async fn next(&mut self) -> Option<Result<$item>> {
                self.0.next().await
            }

            /// Cancels the server-side RPC. Also happens on drop.
            pub fn close(&mut self) {
                self.0.close();
            }
        }
    };
}

block_events_flavor!(
    /// Configures a full block event subscription.
    BlockEventsBuilder,
    UnsignedBlockEventsRequest,
    BlockEventsRequest,
    BlockEventStream,
    Block,
    block_events,
    extract_block
);

block_events_flavor!(
    /// Configures a filtered block event subscription.
    FilteredBlockEventsBuilder,
    UnsignedFilteredBlockEventsRequest,
    FilteredBlockEventsRequest,
    FilteredBlockEventStream,
    FilteredBlock,
    filtered_block_events,
    extract_filtered_block
);

block_events_flavor!(
    /// Configures a block event subscription that includes private data.
    BlockAndPrivateDataEventsBuilder,
    UnsignedBlockAndPrivateDataEventsRequest,
    BlockAndPrivateDataEventsRequest,
    BlockAndPrivateDataEventStream,
    BlockAndPrivateData,
    block_and_private_data_events,
    extract_block_and_private_data
);
