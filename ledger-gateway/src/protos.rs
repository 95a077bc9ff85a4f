//! Protobuf message definitions for the gateway wire protocol.
//!
//! The message set is maintained directly as `prost`-derived structs rather
//! than generated at build time, so the wire schema is part of the reviewed
//! source. Field tags are stable and must never be reused; removing a field
//! requires reserving its tag.
//!
//! Modules follow the protocol namespaces: `common` carries the envelope and
//! block structures, `msp` the membership identity encoding, `peer` the
//! proposal/transaction/event messages, `orderer` the seek requests, and
//! `gateway` the request/response pairs for the gateway service itself.

pub mod common;
pub mod gateway;
pub mod msp;
pub mod orderer;
pub mod peer;
pub mod rpc;
