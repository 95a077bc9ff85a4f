//! Request and response messages for the gateway service.

use super::{common, orderer, peer};

/// A client-signed proposal plus the routing information the gateway needs
/// to evaluate or endorse it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposedTransaction {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub proposal: ::core::option::Option<peer::SignedProposal>,
    /// When non-empty, only peers of these organizations receive the
    /// proposal. Used together with transient data for private flows.
    #[prost(string, repeated, tag = "3")]
    pub endorsing_organizations: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// An endorsed transaction envelope awaiting the client's signature and
/// submission to ordering.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreparedTransaction {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub envelope: ::core::option::Option<common::Envelope>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EvaluateRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub channel_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: ::core::option::Option<peer::SignedProposal>,
    #[prost(string, repeated, tag = "4")]
    pub target_organizations: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EvaluateResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<peer::Response>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndorseRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub channel_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: ::core::option::Option<peer::SignedProposal>,
    #[prost(string, repeated, tag = "4")]
    pub endorsing_organizations: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndorseResponse {
    #[prost(message, optional, tag = "1")]
    pub prepared_transaction: ::core::option::Option<common::Envelope>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub channel_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub prepared_transaction: ::core::option::Option<common::Envelope>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitStatusRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub channel_id: ::prost::alloc::string::String,
    /// Serialized identity of the requesting client.
    #[prost(bytes = "vec", tag = "3")]
    pub identity: ::prost::alloc::vec::Vec<u8>,
}

/// A [`CommitStatusRequest`] kept serialized so the signature covers stable
/// bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedCommitStatusRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub request: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitStatusResponse {
    #[prost(enumeration = "peer::TxValidationCode", tag = "1")]
    pub result: i32,
    #[prost(uint64, tag = "2")]
    pub block_number: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeEventsRequest {
    #[prost(string, tag = "1")]
    pub channel_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub chaincode_id: ::prost::alloc::string::String,
    /// Serialized identity of the requesting client.
    #[prost(bytes = "vec", tag = "3")]
    pub identity: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub start_position: ::core::option::Option<orderer::SeekPosition>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedChaincodeEventsRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub request: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
}

/// All chaincode events emitted within a single block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeEventsResponse {
    #[prost(message, repeated, tag = "1")]
    pub events: ::prost::alloc::vec::Vec<peer::ChaincodeEvent>,
    #[prost(uint64, tag = "2")]
    pub block_number: u64,
}

/// Per-peer failure detail attached to gateway error trailers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorDetail {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub msp_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
}
