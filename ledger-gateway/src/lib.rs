//! Wire-protocol messages, identity, and signing infrastructure shared by
//! clients of a permissioned-ledger gateway.
//!
//! This crate holds everything that must agree byte-for-byte between the
//! parties: the protobuf message set, the serialized creator identity, and
//! the signature encodings. The submission state machine and event streaming
//! live in `ledger-gateway-client`.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod constants;
pub mod crypto;
pub mod protos;
