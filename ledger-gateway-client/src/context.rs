//! Per-transaction randomness and identifier derivation.

use ledger_gateway::{
    constants::NONCE_LENGTH,
    crypto::SigningIdentity,
    protos::common::{ChannelHeader, Header, SignatureHeader},
};
use prost::Message;
use rand::{rngs::OsRng, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};

/// A fresh nonce and the transaction ID derived from it.
///
/// The ID is the hex digest of the nonce concatenated with the creator
/// bytes, so two transactions from the same identity are distinguishable
/// and an ID cannot be forged without the nonce.
pub(crate) struct TransactionContext {
    transaction_id: String,
    nonce: Vec<u8>,
}

impl TransactionContext {
    pub(crate) fn new(signing_identity: &SigningIdentity) -> Self {
        let mut nonce = vec![0_u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);

        let mut preimage = nonce.clone();
        preimage.extend_from_slice(signing_identity.creator());
        let transaction_id = hex::encode(signing_identity.hash(&preimage));

        Self {
            transaction_id,
            nonce,
        }
    }

    pub(crate) fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub(crate) fn nonce(&self) -> &[u8] {
        &self.nonce
    }
}

/// Builds the common message header binding a payload to this context's
/// transaction ID, the channel, and the signing identity.
pub(crate) fn build_header(
    header_type: i32,
    channel_name: &str,
    context: &TransactionContext,
    signing_identity: &SigningIdentity,
    extension: Vec<u8>,
) -> Header {
    let channel_header = ChannelHeader {
        r#type: header_type,
        version: 0,
        timestamp: Some(timestamp_now()),
        channel_id: channel_name.to_string(),
        tx_id: context.transaction_id().to_string(),
        epoch: 0,
        extension,
    };
    let signature_header = SignatureHeader {
        creator: signing_identity.creator().to_vec(),
        nonce: context.nonce().to_vec(),
    };

    Header {
        channel_header: channel_header.encode_to_vec(),
        signature_header: signature_header.encode_to_vec(),
    }
}

fn timestamp_now() -> prost_types::Timestamp {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    prost_types::Timestamp {
        seconds: elapsed.as_secs() as i64,
        nanos: elapsed.subsec_nanos() as i32,
    }
}
