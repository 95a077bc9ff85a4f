//! Client for submitting transactions to and receiving events from a
//! permissioned-ledger gateway.
//!
//! The transaction flow moves through distinct immutable phases, each with
//! its own type: build and sign a proposal, evaluate it or collect
//! endorsements, sign and submit the endorsed transaction, then query its
//! commit status. Every unsigned phase exposes its serialized bytes and
//! signing digest, and can be reconstructed from those bytes in a separate
//! process, so signing can happen offline or inside an HSM.
//!
//! The crate never owns a network connection; callers supply the transport
//! by implementing [`transport::GatewayService`].

#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod checkpoint;
pub mod client;
pub mod commit;
pub mod error;
pub mod events;
pub mod proposal;
pub mod transaction;
pub mod transport;

mod context;
#[cfg(test)]
mod testing;

pub use client::GatewayClient;
pub use error::{GatewayClientError, Result};
